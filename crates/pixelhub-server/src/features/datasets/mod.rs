//! Dataset registry: creation, versioning, activity, recommendations,
//! leaderboard, comparison and platform statistics

pub mod commands;
pub mod queries;
pub mod routes;
pub mod similarity;

pub use routes::{datasets_routes, stats_routes};
pub use similarity::{SharedMetadataScorer, SimilarityScorer};
