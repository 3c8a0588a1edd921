//! Feature modules implementing the PixelHub API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes.
//!
//! # Features
//!
//! - **datasets**: dataset registry, versions, activity, recommendations,
//!   leaderboard, comparison and statistics
//! - **cart**: per-user bundles of dataset files
//! - **badge**: SVG badges and embed snippets
//! - **pixchecker**: syntax check for `.pix` model files
//! - **zenodo**: deposition API client, publish workflow and connection check
//!
//! # Architecture
//!
//! - `commands/` - Write operations (create, delete, record, publish)
//! - `queries/` - Read operations (get, list, history, rank)
//! - `routes.rs` - HTTP route definitions
//!
//! Commands and queries are plain data structures handled by standalone
//! async `handle` functions that receive the repositories they need.

pub mod badge;
pub mod cart;
pub mod datasets;
pub mod pixchecker;
pub mod shared;
pub mod zenodo;

use std::sync::Arc;

use axum::Router;

use crate::config::SiteConfig;
use crate::db::Repositories;
use datasets::SimilarityScorer;
use zenodo::ZenodoClient;

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub repos: Repositories,
    /// Deposition API client used by the publish workflow
    pub zenodo: ZenodoClient,
    pub site: SiteConfig,
    pub similarity: Arc<dyn SimilarityScorer>,
}

impl FeatureState {
    /// State with the default similarity scorer.
    pub fn new(repos: Repositories, zenodo: ZenodoClient, site: SiteConfig) -> Self {
        Self {
            repos,
            zenodo,
            site,
            similarity: Arc::new(datasets::SharedMetadataScorer),
        }
    }

    pub fn with_similarity(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.similarity = scorer;
        self
    }
}

/// Creates the `/api/v1` router with all feature routes mounted
///
/// - `/datasets` - Dataset registry
/// - `/stats` - Platform statistics
/// - `/carts` - Carts
/// - `/pixchecker` - Model syntax check
/// - `/zenodo` - Deposition API connection check
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/datasets", datasets::datasets_routes())
        .nest("/stats", datasets::stats_routes())
        .nest("/carts", cart::cart_routes())
        .nest("/pixchecker", pixchecker::pixchecker_routes())
        .nest("/zenodo", zenodo::zenodo_routes())
        .with_state(state)
}

/// Badge routes, mounted at the site root
pub fn badge_router(state: FeatureState) -> Router<()> {
    badge::badge_routes().with_state(state)
}
