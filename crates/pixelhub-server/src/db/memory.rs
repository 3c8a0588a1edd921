//! In-memory repositories
//!
//! All tables live in one [`MemoryInner`] behind a single `RwLock`, so
//! cascading deletes touch every table atomically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    ActivityRepository, CartRepository, CatalogCounts, DatasetRepository, DbError, DbResult,
};
use crate::models::{
    ActivityTotals, CartItem, Dataset, DatasetFile, DownloadRecord, NewDataset, ViewRecord,
};

#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    datasets: BTreeMap<i64, Dataset>,
    downloads: Vec<DownloadRecord>,
    views: Vec<ViewRecord>,
    cart_items: Vec<CartItem>,
    dataset_ids: Sequence,
    file_ids: Sequence,
    download_ids: Sequence,
    view_ids: Sequence,
    cart_item_ids: Sequence,
}

impl MemoryInner {
    fn insert_dataset(&mut self, new: NewDataset) -> Dataset {
        let id = self.dataset_ids.next();

        let files = new
            .files
            .into_iter()
            .map(|file| DatasetFile {
                id: self.file_ids.next(),
                dataset_id: id,
                name: file.name,
                size: file.size,
                checksum: file.checksum,
            })
            .collect();

        let dataset = Dataset {
            id,
            user_id: new.user_id,
            kind: new.kind,
            metadata: new.metadata,
            files,
            version: new.version,
            previous_version_id: new.previous_version_id,
            created_at: Utc::now(),
        };
        self.datasets.insert(id, dataset.clone());
        dataset
    }

    fn find_file(&self, file_id: i64) -> Option<&DatasetFile> {
        self.datasets
            .values()
            .flat_map(|d| d.files.iter())
            .find(|f| f.id == file_id)
    }
}

/// Repository implementation over process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backdate a download, for leaderboard windows in tests and seeding.
    pub async fn record_download_at(
        &self,
        dataset_id: i64,
        cookie: &str,
        at: DateTime<Utc>,
    ) -> DbResult<DownloadRecord> {
        let mut inner = self.inner.write().await;
        if !inner.datasets.contains_key(&dataset_id) {
            return Err(DbError::not_found("Dataset", dataset_id));
        }
        let record = DownloadRecord {
            id: inner.download_ids.next(),
            dataset_id,
            user_id: None,
            cookie: cookie.to_string(),
            downloaded_at: at,
        };
        inner.downloads.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl DatasetRepository for MemoryStore {
    async fn insert(&self, new: NewDataset) -> DbResult<Dataset> {
        Ok(self.inner.write().await.insert_dataset(new))
    }

    async fn get(&self, id: i64) -> DbResult<Option<Dataset>> {
        Ok(self.inner.read().await.datasets.get(&id).cloned())
    }

    async fn list_all(&self) -> DbResult<Vec<Dataset>> {
        Ok(self.inner.read().await.datasets.values().cloned().collect())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> DbResult<Vec<Dataset>> {
        let inner = self.inner.read().await;
        Ok(inner
            .datasets
            .values()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> DbResult<i64> {
        Ok(self.inner.read().await.datasets.len() as i64)
    }

    async fn children(&self, parent_id: i64) -> DbResult<Vec<Dataset>> {
        let inner = self.inner.read().await;
        let mut children: Vec<Dataset> = inner
            .datasets
            .values()
            .filter(|d| d.previous_version_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by_key(|d| d.version);
        Ok(children)
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .datasets
            .remove(&id)
            .ok_or_else(|| DbError::not_found("Dataset", id))?;

        let file_ids: HashSet<i64> = removed.files.iter().map(|f| f.id).collect();
        inner.downloads.retain(|r| r.dataset_id != id);
        inner.views.retain(|r| r.dataset_id != id);
        inner.cart_items.retain(|item| !file_ids.contains(&item.file_id));
        Ok(())
    }

    async fn dataset_dois(&self) -> DbResult<Vec<Option<String>>> {
        Ok(self
            .inner
            .read()
            .await
            .datasets
            .values()
            .map(|d| d.metadata.dataset_doi.clone())
            .collect())
    }

    async fn record_publication(
        &self,
        id: i64,
        deposition_id: i64,
        doi: Option<String>,
    ) -> DbResult<Dataset> {
        let mut inner = self.inner.write().await;
        let dataset = inner
            .datasets
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("Dataset", id))?;
        dataset.metadata.deposition_id = Some(deposition_id);
        dataset.metadata.dataset_doi = doi;
        Ok(dataset.clone())
    }

    async fn get_file(&self, file_id: i64) -> DbResult<Option<DatasetFile>> {
        Ok(self.inner.read().await.find_file(file_id).cloned())
    }

    async fn counts(&self) -> DbResult<CatalogCounts> {
        let inner = self.inner.read().await;
        let datasets = inner.datasets.values();
        Ok(CatalogCounts {
            datasets: inner.datasets.len() as i64,
            synchronized: datasets.clone().filter(|d| d.is_synchronized()).count() as i64,
            authors: datasets.clone().map(|d| d.metadata.authors.len() as i64).sum(),
            files: datasets.map(|d| d.files.len() as i64).sum(),
        })
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn record_download(
        &self,
        dataset_id: i64,
        user_id: Option<i64>,
        cookie: &str,
    ) -> DbResult<DownloadRecord> {
        let mut inner = self.inner.write().await;
        if !inner.datasets.contains_key(&dataset_id) {
            return Err(DbError::not_found("Dataset", dataset_id));
        }
        let record = DownloadRecord {
            id: inner.download_ids.next(),
            dataset_id,
            user_id,
            cookie: cookie.to_string(),
            downloaded_at: Utc::now(),
        };
        inner.downloads.push(record.clone());
        Ok(record)
    }

    async fn download_count(&self, dataset_id: i64) -> DbResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.downloads.iter().filter(|r| r.dataset_id == dataset_id).count() as i64)
    }

    async fn download_counts(&self) -> DbResult<HashMap<i64, i64>> {
        let inner = self.inner.read().await;
        let mut counts = HashMap::new();
        for record in &inner.downloads {
            *counts.entry(record.dataset_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn record_view(
        &self,
        dataset_id: i64,
        user_id: Option<i64>,
        cookie: &str,
    ) -> DbResult<Option<ViewRecord>> {
        let mut inner = self.inner.write().await;
        if !inner.datasets.contains_key(&dataset_id) {
            return Err(DbError::not_found("Dataset", dataset_id));
        }
        if inner
            .views
            .iter()
            .any(|v| v.dataset_id == dataset_id && v.cookie == cookie)
        {
            return Ok(None);
        }
        let record = ViewRecord {
            id: inner.view_ids.next(),
            dataset_id,
            user_id,
            cookie: cookie.to_string(),
            viewed_at: Utc::now(),
        };
        inner.views.push(record.clone());
        Ok(Some(record))
    }

    async fn top_downloaded_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<(i64, i64)>> {
        let inner = self.inner.read().await;
        let mut counts: BTreeMap<i64, i64> = BTreeMap::new();
        for record in inner.downloads.iter().filter(|r| r.downloaded_at >= since) {
            *counts.entry(record.dataset_id).or_insert(0) += 1;
        }

        // BTreeMap iteration is by ascending id; the stable sort keeps that
        // order among equal counts.
        let mut ranked: Vec<(i64, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit.max(0) as usize);
        Ok(ranked)
    }

    async fn totals(&self) -> DbResult<ActivityTotals> {
        let inner = self.inner.read().await;
        Ok(ActivityTotals {
            downloads: inner.downloads.len() as i64,
            views: inner.views.len() as i64,
        })
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn items(&self, user_id: i64) -> DbResult<Vec<CartItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .cart_items
            .iter()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn add_item(&self, user_id: i64, file_id: i64) -> DbResult<CartItem> {
        let mut inner = self.inner.write().await;
        if inner.find_file(file_id).is_none() {
            return Err(DbError::not_found("File", file_id));
        }
        if inner
            .cart_items
            .iter()
            .any(|item| item.user_id == user_id && item.file_id == file_id)
        {
            return Err(DbError::duplicate("Cart item", file_id));
        }
        let item = CartItem {
            id: inner.cart_item_ids.next(),
            user_id,
            file_id,
            added_at: Utc::now(),
        };
        inner.cart_items.push(item.clone());
        Ok(item)
    }

    async fn remove_item(&self, user_id: i64, file_id: i64) -> DbResult<()> {
        let mut inner = self.inner.write().await;
        let before = inner.cart_items.len();
        inner
            .cart_items
            .retain(|item| !(item.user_id == user_id && item.file_id == file_id));
        if inner.cart_items.len() == before {
            return Err(DbError::not_found("Cart item", file_id));
        }
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> DbResult<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.cart_items.len();
        inner.cart_items.retain(|item| item.user_id != user_id);
        Ok((before - inner.cart_items.len()) as u64)
    }

    async fn checkout(&self, user_id: i64, new: NewDataset) -> DbResult<Dataset> {
        let mut inner = self.inner.write().await;
        let dataset = inner.insert_dataset(new);
        inner.cart_items.retain(|item| item.user_id != user_id);
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DatasetKind, DatasetMetadata, NewDatasetFile};
    use chrono::Duration;

    fn new_dataset(title: &str, parent: Option<i64>, version: i32) -> NewDataset {
        NewDataset {
            user_id: 1,
            kind: DatasetKind::default(),
            metadata: DatasetMetadata {
                title: title.to_string(),
                ..Default::default()
            },
            files: vec![NewDatasetFile {
                name: format!("{}.pix", title),
                size: 10,
                checksum: "abc".to_string(),
            }],
            version,
            previous_version_id: parent,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids() {
        let store = MemoryStore::new();
        let a = store.insert(new_dataset("a", None, 1)).await.unwrap();
        let b = store.insert(new_dataset("b", None, 1)).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(b.files[0].id, 2);
        assert_eq!(b.files[0].dataset_id, 2);
    }

    #[tokio::test]
    async fn test_list_page_newest_first() {
        let store = MemoryStore::new();
        for t in ["a", "b", "c"] {
            store.insert(new_dataset(t, None, 1)).await.unwrap();
        }
        let page = store.list_page(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].title(), "b");
    }

    #[tokio::test]
    async fn test_delete_cascades_but_keeps_children() {
        let store = MemoryStore::new();
        let root = store.insert(new_dataset("root", None, 1)).await.unwrap();
        let child = store.insert(new_dataset("child", Some(root.id), 2)).await.unwrap();

        store.record_download(root.id, None, "c1").await.unwrap();
        store.record_view(root.id, None, "c1").await.unwrap();
        store.add_item(7, root.files[0].id).await.unwrap();

        store.delete(root.id).await.unwrap();

        assert!(store.get(root.id).await.unwrap().is_none());
        assert_eq!(store.download_count(root.id).await.unwrap(), 0);
        assert!(store.items(7).await.unwrap().is_empty());
        assert_eq!(store.totals().await.unwrap(), ActivityTotals::default());

        let child = store.get(child.id).await.unwrap().unwrap();
        assert_eq!(child.previous_version_id, Some(root.id));
    }

    #[tokio::test]
    async fn test_delete_unknown() {
        let store = MemoryStore::new();
        assert!(matches!(store.delete(1).await, Err(DbError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_view_recorded_once_per_cookie() {
        let store = MemoryStore::new();
        let ds = store.insert(new_dataset("a", None, 1)).await.unwrap();

        assert!(store.record_view(ds.id, None, "c").await.unwrap().is_some());
        assert!(store.record_view(ds.id, None, "c").await.unwrap().is_none());
        assert!(store.record_view(ds.id, None, "d").await.unwrap().is_some());
        assert_eq!(store.totals().await.unwrap().views, 2);
    }

    #[tokio::test]
    async fn test_top_downloaded_since_window_and_ties() {
        let store = MemoryStore::new();
        let a = store.insert(new_dataset("a", None, 1)).await.unwrap();
        let b = store.insert(new_dataset("b", None, 1)).await.unwrap();
        let c = store.insert(new_dataset("c", None, 1)).await.unwrap();

        let now = Utc::now();
        store.record_download_at(a.id, "x", now).await.unwrap();
        store.record_download_at(b.id, "x", now).await.unwrap();
        store.record_download_at(c.id, "x", now).await.unwrap();
        store.record_download_at(c.id, "y", now).await.unwrap();
        store
            .record_download_at(a.id, "old", now - Duration::days(40))
            .await
            .unwrap();

        let top = store
            .top_downloaded_since(now - Duration::days(7), 3)
            .await
            .unwrap();
        assert_eq!(top, vec![(c.id, 2), (a.id, 1), (b.id, 1)]);
    }

    #[tokio::test]
    async fn test_cart_duplicate_and_missing_file() {
        let store = MemoryStore::new();
        let ds = store.insert(new_dataset("a", None, 1)).await.unwrap();
        let file_id = ds.files[0].id;

        store.add_item(1, file_id).await.unwrap();
        assert!(matches!(store.add_item(1, file_id).await, Err(DbError::Duplicate(_))));
        assert!(store.add_item(2, file_id).await.is_ok());
        assert!(matches!(store.add_item(1, 999).await, Err(DbError::NotFound(_))));

        store.remove_item(1, file_id).await.unwrap();
        assert!(matches!(store.remove_item(1, file_id).await, Err(DbError::NotFound(_))));
        assert_eq!(store.clear(2).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_checkout_inserts_and_clears_only_that_cart() {
        let store = MemoryStore::new();
        let ds = store.insert(new_dataset("a", None, 1)).await.unwrap();
        store.add_item(1, ds.files[0].id).await.unwrap();
        store.add_item(2, ds.files[0].id).await.unwrap();

        let bundle = store.checkout(1, new_dataset("bundle", None, 1)).await.unwrap();

        assert!(store.get(bundle.id).await.unwrap().is_some());
        assert!(store.items(1).await.unwrap().is_empty());
        assert_eq!(store.items(2).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_publication() {
        let store = MemoryStore::new();
        let ds = store.insert(new_dataset("a", None, 1)).await.unwrap();

        let updated = store
            .record_publication(ds.id, 4, Some("10.5281/zenodo.1000001".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.metadata.deposition_id, Some(4));
        assert_eq!(
            store.dataset_dois().await.unwrap(),
            vec![Some("10.5281/zenodo.1000001".to_string())]
        );
        assert_eq!(store.counts().await.unwrap().synchronized, 1);
    }
}
