//! In-memory deposition store
//!
//! The store is an owned value created at startup and shared through the
//! router state. All state sits behind one async `RwLock`; publish and
//! delete hold the write lock across their whole read-compute-write
//! sequence, so two concurrent publishes can never compute the same DOI.
//!
//! Nothing is persisted: a restart forgets every deposition and DOI
//! allocation starts over.

use pixelhub_common::deposition::{Deposition, DepositionFile, DepositionState, NewDeposition};
use pixelhub_common::doi::next_doi;
use serde_json::{json, Map};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{FakenodoError, FakenodoResult};

#[derive(Debug)]
struct Inner {
    depositions: BTreeMap<u64, Deposition>,
    files: BTreeMap<u64, DepositionFile>,
    next_deposition_id: u64,
    next_file_id: u64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            depositions: BTreeMap::new(),
            files: BTreeMap::new(),
            next_deposition_id: 1,
            next_file_id: 1,
        }
    }
}

impl Inner {
    fn insert(&mut self, new: NewDeposition, state: DepositionState, doi: Option<String>) -> Deposition {
        let id = self.next_deposition_id;
        self.next_deposition_id += 1;

        let deposition = Deposition {
            id,
            title: new.title,
            description: new.description,
            state,
            doi,
            metadata: new.metadata,
        };
        self.depositions.insert(id, deposition.clone());
        deposition
    }
}

/// Shared handle to the deposition map. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct DepositionStore {
    inner: Arc<RwLock<Inner>>,
}

impl DepositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one draft and one published sample deposition.
    pub fn with_seed_data() -> Self {
        let mut inner = Inner::default();

        let mut keywords = Map::new();
        keywords.insert("keywords".to_string(), json!(["test"]));
        inner.insert(
            NewDeposition {
                title: "Initial dataset".to_string(),
                description: "A sample dataset".to_string(),
                metadata: keywords,
            },
            DepositionState::Draft,
            None,
        );
        inner.insert(
            NewDeposition {
                title: "Published dataset".to_string(),
                description: "Already published".to_string(),
                metadata: Map::new(),
            },
            DepositionState::Published,
            Some("10.5281/zenodo.1000002".to_string()),
        );

        Self {
            inner: Arc::new(RwLock::new(inner)),
        }
    }

    /// Create a new draft deposition with a fresh id.
    #[tracing::instrument(skip(self, new), fields(title = %new.title))]
    pub async fn create(&self, new: NewDeposition) -> Deposition {
        let mut inner = self.inner.write().await;
        let deposition = inner.insert(new, DepositionState::Draft, None);
        tracing::info!(deposition_id = deposition.id, "Deposition created");
        deposition
    }

    pub async fn get(&self, id: u64) -> Option<Deposition> {
        self.inner.read().await.depositions.get(&id).cloned()
    }

    /// All depositions ordered by id.
    pub async fn list(&self) -> Vec<Deposition> {
        self.inner.read().await.depositions.values().cloned().collect()
    }

    /// Publish a deposition.
    ///
    /// A deposition that already carries a DOI keeps it. Otherwise the
    /// provided DOI is used, or the next sequential DOI over every DOI in
    /// the store. Unknown ids leave the store untouched.
    #[tracing::instrument(skip(self))]
    pub async fn publish(&self, id: u64, provided_doi: Option<String>) -> FakenodoResult<Deposition> {
        let mut inner = self.inner.write().await;

        let needs_doi = match inner.depositions.get(&id) {
            Some(deposition) => deposition.doi.is_none(),
            None => return Err(FakenodoError::NotFound(id)),
        };

        let assigned = if needs_doi {
            let provided = provided_doi.filter(|doi| !doi.trim().is_empty());
            Some(provided.unwrap_or_else(|| {
                next_doi(inner.depositions.values().map(|d| d.doi.as_deref()))
            }))
        } else {
            None
        };

        let deposition = inner
            .depositions
            .get_mut(&id)
            .ok_or(FakenodoError::NotFound(id))?;

        if let Some(doi) = assigned {
            deposition.doi = Some(doi);
        }
        deposition.state = DepositionState::Published;

        tracing::info!(
            deposition_id = id,
            doi = deposition.doi.as_deref().unwrap_or_default(),
            "Deposition published"
        );

        Ok(deposition.clone())
    }

    /// Remove a deposition and its files.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: u64) -> FakenodoResult<Deposition> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .depositions
            .remove(&id)
            .ok_or(FakenodoError::NotFound(id))?;
        inner.files.retain(|_, file| file.deposition_id != id);

        tracing::info!(deposition_id = id, "Deposition deleted");
        Ok(removed)
    }

    /// Attach a file record to an existing deposition.
    pub async fn add_file(
        &self,
        deposition_id: u64,
        name: String,
        size: u64,
        checksum: String,
    ) -> FakenodoResult<DepositionFile> {
        let mut inner = self.inner.write().await;
        if !inner.depositions.contains_key(&deposition_id) {
            return Err(FakenodoError::NotFound(deposition_id));
        }

        let id = inner.next_file_id;
        inner.next_file_id += 1;

        let file = DepositionFile {
            id,
            deposition_id,
            name,
            size,
            checksum,
        };
        inner.files.insert(id, file.clone());

        tracing::debug!(deposition_id, file_id = id, name = %file.name, "File attached");
        Ok(file)
    }

    pub async fn files(&self, deposition_id: u64) -> Vec<DepositionFile> {
        self.inner
            .read()
            .await
            .files
            .values()
            .filter(|file| file.deposition_id == deposition_id)
            .cloned()
            .collect()
    }
}
