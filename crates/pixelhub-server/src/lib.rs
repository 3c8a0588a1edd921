//! PixelHub Server Library
//!
//! HTTP server of the PixelHub dataset-sharing platform.
//!
//! # Overview
//!
//! - **Dataset registry**: datasets with metadata, files and a version tree
//! - **Versioning**: new versions clone their parent; history resolves the
//!   whole tree a dataset belongs to
//! - **Recommendations**: similar datasets ranked by a pluggable scorer
//! - **Activity**: download and view logs feeding counts and a leaderboard
//! - **Carts**: per-user file bundles checked out into new datasets
//! - **Badges**: SVG badges with title, downloads and DOI
//! - **Publishing**: deposition and DOI assignment through the Zenodo
//!   deposition API (served locally by fakenodo)
//!
//! # Architecture
//!
//! Features are vertical slices under [`features`], each split into
//! commands (writes), queries (reads) and routes. Storage sits behind the
//! repository traits in [`db`], with PostgreSQL and in-memory
//! implementations.
//!
//! # Example
//!
//! ```no_run
//! use pixelhub_server::{api, config::Config, db::Repositories};
//! use pixelhub_server::features::{zenodo::ZenodoClient, FeatureState};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let zenodo = ZenodoClient::new(&config.zenodo)?;
//! let state = FeatureState::new(Repositories::in_memory(), zenodo, config.server.site.clone());
//! let app = api::create_router(state, &config.cors);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;

// Re-export commonly used types
pub use error::{AppError, AppResult};
