//! Persistence layer
//!
//! Feature handlers talk to storage through the repository traits below.
//! Two implementations exist:
//!
//! - [`memory::MemoryStore`]: process-local maps behind a tokio `RwLock`,
//!   used by tests and when no `DATABASE_URL` is configured
//! - [`postgres::PgStore`]: PostgreSQL through `sqlx`, schema managed by the
//!   embedded migrations in `migrations/`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::models::{ActivityTotals, CartItem, Dataset, DatasetFile, DownloadRecord, NewDataset, ViewRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration failure at startup
    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Record already exists (unique constraint violation)
    #[error("{0}")]
    Duplicate(String),

    /// Stored data could not be mapped back to the domain model
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Create a not found error with resource context
    pub fn not_found(resource_type: &str, identifier: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} '{}' not found", resource_type, identifier))
    }

    /// Create a duplicate error with resource context
    pub fn duplicate(resource_type: &str, identifier: impl std::fmt::Display) -> Self {
        Self::Duplicate(format!("{} '{}' already exists", resource_type, identifier))
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Catalog-wide counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub datasets: i64,
    /// Datasets that carry a dataset DOI
    pub synchronized: i64,
    pub authors: i64,
    pub files: i64,
}

/// Dataset storage
#[async_trait]
pub trait DatasetRepository: Send + Sync {
    /// Insert a dataset with its authors and files, assigning ids.
    async fn insert(&self, new: NewDataset) -> DbResult<Dataset>;

    async fn get(&self, id: i64) -> DbResult<Option<Dataset>>;

    /// Every dataset, ordered by id.
    async fn list_all(&self) -> DbResult<Vec<Dataset>>;

    /// One page of datasets, newest first.
    async fn list_page(&self, offset: i64, limit: i64) -> DbResult<Vec<Dataset>>;

    async fn count(&self) -> DbResult<i64>;

    /// Datasets whose `previous_version_id` is `parent_id`, ordered by version.
    async fn children(&self, parent_id: i64) -> DbResult<Vec<Dataset>>;

    /// Delete a dataset with its files, activity records and cart items.
    /// Child versions are kept and keep their dangling parent pointer.
    async fn delete(&self, id: i64) -> DbResult<()>;

    /// The dataset DOI of every dataset, `None` when unpublished.
    async fn dataset_dois(&self) -> DbResult<Vec<Option<String>>>;

    /// Store the outcome of a publish on the dataset metadata.
    async fn record_publication(
        &self,
        id: i64,
        deposition_id: i64,
        doi: Option<String>,
    ) -> DbResult<Dataset>;

    async fn get_file(&self, file_id: i64) -> DbResult<Option<DatasetFile>>;

    async fn counts(&self) -> DbResult<CatalogCounts>;
}

/// Download and view logs
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn record_download(
        &self,
        dataset_id: i64,
        user_id: Option<i64>,
        cookie: &str,
    ) -> DbResult<DownloadRecord>;

    async fn download_count(&self, dataset_id: i64) -> DbResult<i64>;

    /// Download count per dataset id. Datasets without downloads are absent.
    async fn download_counts(&self) -> DbResult<HashMap<i64, i64>>;

    /// Record a view unless this cookie already viewed the dataset.
    /// Returns `None` when the view was already recorded.
    async fn record_view(
        &self,
        dataset_id: i64,
        user_id: Option<i64>,
        cookie: &str,
    ) -> DbResult<Option<ViewRecord>>;

    /// `(dataset_id, downloads)` since `since`, most downloaded first,
    /// ties broken by ascending dataset id.
    async fn top_downloaded_since(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> DbResult<Vec<(i64, i64)>>;

    async fn totals(&self) -> DbResult<ActivityTotals>;
}

/// Per-user carts
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Items of a user's cart in insertion order.
    async fn items(&self, user_id: i64) -> DbResult<Vec<CartItem>>;

    /// Fails with `Duplicate` when the file is already in the cart and
    /// `NotFound` when the file does not exist.
    async fn add_item(&self, user_id: i64, file_id: i64) -> DbResult<CartItem>;

    async fn remove_item(&self, user_id: i64, file_id: i64) -> DbResult<()>;

    /// Returns the number of removed items.
    async fn clear(&self, user_id: i64) -> DbResult<u64>;

    /// Insert the dataset built from the cart and empty the cart, as one
    /// atomic step. On failure the cart is left untouched.
    async fn checkout(&self, user_id: i64, new: NewDataset) -> DbResult<Dataset>;
}

/// The repositories a running server uses
#[derive(Clone)]
pub struct Repositories {
    pub datasets: Arc<dyn DatasetRepository>,
    pub activity: Arc<dyn ActivityRepository>,
    pub carts: Arc<dyn CartRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self::from_store(MemoryStore::new())
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::from_store(PgStore::new(pool))
    }

    /// Wrap one store that backs every repository.
    pub fn from_store<S>(store: S) -> Self
    where
        S: DatasetRepository + ActivityRepository + CartRepository + Clone + 'static,
    {
        Self {
            datasets: Arc::new(store.clone()),
            activity: Arc::new(store.clone()),
            carts: Arc::new(store),
        }
    }
}

pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Apply the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}
