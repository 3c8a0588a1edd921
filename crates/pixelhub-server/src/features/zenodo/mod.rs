//! Deposition API integration: client, publish workflow and connection checks

pub mod client;
pub mod commands;
pub mod queries;
pub mod routes;

pub use client::{ZenodoClient, ZenodoError, ZenodoResult};
pub use commands::{PublishDatasetCommand, PublishDatasetResponse};
pub use queries::{ConnectionQuery, ConnectionReport};
pub use routes::zenodo_routes;
