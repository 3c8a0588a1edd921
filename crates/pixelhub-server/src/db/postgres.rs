//! PostgreSQL repositories
//!
//! Queries are built at runtime with `sqlx::query_as`, so the crate builds
//! without a live database. Dataset rows are assembled from three tables:
//! `datasets`, `dataset_authors` and `dataset_files`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;

use super::{
    ActivityRepository, CartRepository, CatalogCounts, DatasetRepository, DbError, DbResult,
};
use crate::models::{
    ActivityTotals, Author, CartItem, Dataset, DatasetFile, DatasetKind, DatasetMetadata,
    DownloadRecord, NewDataset, PixPayload, ViewRecord,
};

const DATASET_COLUMNS: &str = "id, user_id, kind, games_count, encoding, title, description, \
     publication_type, publication_doi, dataset_doi, deposition_id, tags, version, \
     previous_version_id, created_at";

/// Repository implementation over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn hydrate(&self, rows: Vec<DatasetRow>) -> DbResult<Vec<Dataset>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let authors = sqlx::query_as::<_, AuthorRow>(
            "SELECT dataset_id, name, affiliation, orcid FROM dataset_authors \
             WHERE dataset_id = ANY($1) ORDER BY dataset_id, position",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let files = sqlx::query_as::<_, FileRow>(
            "SELECT id, dataset_id, name, size, checksum FROM dataset_files \
             WHERE dataset_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut authors_by_dataset: HashMap<i64, Vec<Author>> = HashMap::new();
        for row in authors {
            authors_by_dataset
                .entry(row.dataset_id)
                .or_default()
                .push(row.into_author());
        }

        let mut files_by_dataset: HashMap<i64, Vec<DatasetFile>> = HashMap::new();
        for row in files {
            files_by_dataset
                .entry(row.dataset_id)
                .or_default()
                .push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let authors = authors_by_dataset.remove(&row.id).unwrap_or_default();
                let files = files_by_dataset.remove(&row.id).unwrap_or_default();
                row.into_dataset(authors, files)
            })
            .collect()
    }

    async fn fetch_datasets(&self, sql: &str) -> DbResult<Vec<Dataset>> {
        let rows = sqlx::query_as::<_, DatasetRow>(sql)
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn insert_dataset(
        tx: &mut Transaction<'_, Postgres>,
        new: NewDataset,
    ) -> DbResult<Dataset> {
        let (games_count, encoding) = match &new.kind {
            DatasetKind::Pix(payload) => (payload.games_count, payload.encoding.clone()),
        };

        let row = sqlx::query_as::<_, DatasetRow>(&format!(
            "INSERT INTO datasets (user_id, kind, games_count, encoding, title, description, \
             publication_type, publication_doi, dataset_doi, deposition_id, tags, version, \
             previous_version_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {}",
            DATASET_COLUMNS
        ))
        .bind(new.user_id)
        .bind(crate::models::DatasetCapabilities::type_tag(&new.kind))
        .bind(games_count)
        .bind(encoding)
        .bind(&new.metadata.title)
        .bind(&new.metadata.description)
        .bind(new.metadata.publication_type.as_str())
        .bind(&new.metadata.publication_doi)
        .bind(&new.metadata.dataset_doi)
        .bind(new.metadata.deposition_id)
        .bind(&new.metadata.tags)
        .bind(new.version)
        .bind(new.previous_version_id)
        .fetch_one(&mut **tx)
        .await?;

        let files = Self::insert_children(tx, row.id, &new).await?;
        row.into_dataset(new.metadata.authors, files)
    }

    async fn insert_children(
        tx: &mut Transaction<'_, Postgres>,
        dataset_id: i64,
        new: &NewDataset,
    ) -> DbResult<Vec<DatasetFile>> {
        for (position, author) in new.metadata.authors.iter().enumerate() {
            sqlx::query(
                "INSERT INTO dataset_authors (dataset_id, position, name, affiliation, orcid) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(dataset_id)
            .bind(position as i32)
            .bind(&author.name)
            .bind(&author.affiliation)
            .bind(&author.orcid)
            .execute(&mut **tx)
            .await?;
        }

        let mut files = Vec::with_capacity(new.files.len());
        for file in &new.files {
            let row = sqlx::query_as::<_, FileRow>(
                "INSERT INTO dataset_files (dataset_id, name, size, checksum) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, dataset_id, name, size, checksum",
            )
            .bind(dataset_id)
            .bind(&file.name)
            .bind(file.size)
            .bind(&file.checksum)
            .fetch_one(&mut **tx)
            .await?;
            files.push(row.into());
        }

        Ok(files)
    }
}

#[derive(Debug, FromRow)]
struct DatasetRow {
    id: i64,
    user_id: i64,
    kind: String,
    games_count: Option<i32>,
    encoding: Option<String>,
    title: String,
    description: String,
    publication_type: String,
    publication_doi: Option<String>,
    dataset_doi: Option<String>,
    deposition_id: Option<i64>,
    tags: Vec<String>,
    version: i32,
    previous_version_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl DatasetRow {
    fn into_dataset(self, authors: Vec<Author>, files: Vec<DatasetFile>) -> DbResult<Dataset> {
        let kind = match self.kind.as_str() {
            "pix" => DatasetKind::Pix(PixPayload {
                games_count: self.games_count,
                encoding: self.encoding,
            }),
            other => {
                return Err(DbError::Corrupt(format!(
                    "dataset {} has unknown kind '{}'",
                    self.id, other
                )))
            },
        };
        let publication_type = self
            .publication_type
            .parse()
            .map_err(|e| DbError::Corrupt(format!("dataset {}: {}", self.id, e)))?;

        Ok(Dataset {
            id: self.id,
            user_id: self.user_id,
            kind,
            metadata: DatasetMetadata {
                title: self.title,
                description: self.description,
                publication_type,
                publication_doi: self.publication_doi,
                dataset_doi: self.dataset_doi,
                deposition_id: self.deposition_id,
                tags: self.tags,
                authors,
            },
            files,
            version: self.version,
            previous_version_id: self.previous_version_id,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AuthorRow {
    dataset_id: i64,
    name: String,
    affiliation: Option<String>,
    orcid: Option<String>,
}

impl AuthorRow {
    fn into_author(self) -> Author {
        Author {
            name: self.name,
            affiliation: self.affiliation,
            orcid: self.orcid,
        }
    }
}

#[derive(Debug, FromRow)]
struct FileRow {
    id: i64,
    dataset_id: i64,
    name: String,
    size: i64,
    checksum: String,
}

impl From<FileRow> for DatasetFile {
    fn from(row: FileRow) -> Self {
        Self {
            id: row.id,
            dataset_id: row.dataset_id,
            name: row.name,
            size: row.size,
            checksum: row.checksum,
        }
    }
}

#[derive(Debug, FromRow)]
struct DownloadRow {
    id: i64,
    dataset_id: i64,
    user_id: Option<i64>,
    cookie: String,
    downloaded_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ViewRow {
    id: i64,
    dataset_id: i64,
    user_id: Option<i64>,
    cookie: String,
    viewed_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CartItemRow {
    id: i64,
    user_id: i64,
    file_id: i64,
    added_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            file_id: row.file_id,
            added_at: row.added_at,
        }
    }
}

#[async_trait]
impl DatasetRepository for PgStore {
    #[tracing::instrument(skip(self, new), fields(title = %new.metadata.title))]
    async fn insert(&self, new: NewDataset) -> DbResult<Dataset> {
        let mut tx = self.pool.begin().await?;
        let dataset = Self::insert_dataset(&mut tx, new).await?;
        tx.commit().await?;
        Ok(dataset)
    }

    async fn get(&self, id: i64) -> DbResult<Option<Dataset>> {
        let row = sqlx::query_as::<_, DatasetRow>(&format!(
            "SELECT {} FROM datasets WHERE id = $1",
            DATASET_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> DbResult<Vec<Dataset>> {
        self.fetch_datasets(&format!("SELECT {} FROM datasets ORDER BY id", DATASET_COLUMNS))
            .await
    }

    async fn list_page(&self, offset: i64, limit: i64) -> DbResult<Vec<Dataset>> {
        let rows = sqlx::query_as::<_, DatasetRow>(&format!(
            "SELECT {} FROM datasets ORDER BY id DESC LIMIT $1 OFFSET $2",
            DATASET_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM datasets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn children(&self, parent_id: i64) -> DbResult<Vec<Dataset>> {
        let rows = sqlx::query_as::<_, DatasetRow>(&format!(
            "SELECT {} FROM datasets WHERE previous_version_id = $1 ORDER BY version, id",
            DATASET_COLUMNS
        ))
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Dataset", id));
        }
        Ok(())
    }

    async fn dataset_dois(&self) -> DbResult<Vec<Option<String>>> {
        let dois: Vec<Option<String>> = sqlx::query_scalar("SELECT dataset_doi FROM datasets")
            .fetch_all(&self.pool)
            .await?;
        Ok(dois)
    }

    async fn record_publication(
        &self,
        id: i64,
        deposition_id: i64,
        doi: Option<String>,
    ) -> DbResult<Dataset> {
        let result = sqlx::query(
            "UPDATE datasets SET deposition_id = $2, dataset_doi = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(deposition_id)
        .bind(doi)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Dataset", id));
        }

        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found("Dataset", id))
    }

    async fn get_file(&self, file_id: i64) -> DbResult<Option<DatasetFile>> {
        let row = sqlx::query_as::<_, FileRow>(
            "SELECT id, dataset_id, name, size, checksum FROM dataset_files WHERE id = $1",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn counts(&self) -> DbResult<CatalogCounts> {
        let (datasets, synchronized, authors, files): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
               (SELECT COUNT(*) FROM datasets), \
               (SELECT COUNT(*) FROM datasets WHERE dataset_doi IS NOT NULL), \
               (SELECT COUNT(*) FROM dataset_authors), \
               (SELECT COUNT(*) FROM dataset_files)",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogCounts {
            datasets,
            synchronized,
            authors,
            files,
        })
    }
}

#[async_trait]
impl ActivityRepository for PgStore {
    async fn record_download(
        &self,
        dataset_id: i64,
        user_id: Option<i64>,
        cookie: &str,
    ) -> DbResult<DownloadRecord> {
        let row = sqlx::query_as::<_, DownloadRow>(
            "INSERT INTO download_records (dataset_id, user_id, cookie) VALUES ($1, $2, $3) \
             RETURNING id, dataset_id, user_id, cookie, downloaded_at",
        )
        .bind(dataset_id)
        .bind(user_id)
        .bind(cookie)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                DbError::not_found("Dataset", dataset_id)
            },
            other => DbError::Sqlx(other),
        })?;

        Ok(DownloadRecord {
            id: row.id,
            dataset_id: row.dataset_id,
            user_id: row.user_id,
            cookie: row.cookie,
            downloaded_at: row.downloaded_at,
        })
    }

    async fn download_count(&self, dataset_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM download_records WHERE dataset_id = $1")
                .bind(dataset_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn download_counts(&self) -> DbResult<HashMap<i64, i64>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT dataset_id, COUNT(*) FROM download_records GROUP BY dataset_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn record_view(
        &self,
        dataset_id: i64,
        user_id: Option<i64>,
        cookie: &str,
    ) -> DbResult<Option<ViewRecord>> {
        let row = sqlx::query_as::<_, ViewRow>(
            "INSERT INTO view_records (dataset_id, user_id, cookie) VALUES ($1, $2, $3) \
             ON CONFLICT (dataset_id, cookie) DO NOTHING \
             RETURNING id, dataset_id, user_id, cookie, viewed_at",
        )
        .bind(dataset_id)
        .bind(user_id)
        .bind(cookie)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                DbError::not_found("Dataset", dataset_id)
            },
            other => DbError::Sqlx(other),
        })?;

        Ok(row.map(|row| ViewRecord {
            id: row.id,
            dataset_id: row.dataset_id,
            user_id: row.user_id,
            cookie: row.cookie,
            viewed_at: row.viewed_at,
        }))
    }

    async fn top_downloaded_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT dataset_id, COUNT(*) AS downloads FROM download_records \
             WHERE downloaded_at >= $1 \
             GROUP BY dataset_id \
             ORDER BY downloads DESC, dataset_id ASC \
             LIMIT $2",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn totals(&self) -> DbResult<ActivityTotals> {
        let (downloads, views): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM download_records), (SELECT COUNT(*) FROM view_records)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(ActivityTotals { downloads, views })
    }
}

#[async_trait]
impl CartRepository for PgStore {
    async fn items(&self, user_id: i64) -> DbResult<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT id, user_id, file_id, added_at FROM cart_items WHERE user_id = $1 ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn add_item(&self, user_id: i64, file_id: i64) -> DbResult<CartItem> {
        let row = sqlx::query_as::<_, CartItemRow>(
            "INSERT INTO cart_items (user_id, file_id) VALUES ($1, $2) \
             RETURNING id, user_id, file_id, added_at",
        )
        .bind(user_id)
        .bind(file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DbError::duplicate("Cart item", file_id)
            },
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                DbError::not_found("File", file_id)
            },
            other => DbError::Sqlx(other),
        })?;
        Ok(row.into())
    }

    async fn remove_item(&self, user_id: i64, file_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND file_id = $2")
            .bind(user_id)
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart item", file_id));
        }
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn checkout(&self, user_id: i64, new: NewDataset) -> DbResult<Dataset> {
        let mut tx = self.pool.begin().await?;
        let dataset = Self::insert_dataset(&mut tx, new).await?;
        sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(dataset)
    }
}
