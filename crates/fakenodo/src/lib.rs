//! Fakenodo
//!
//! A stand-in for the Zenodo deposition API. Depositions live in an
//! in-memory [`DepositionStore`] owned by the running service, so every
//! restart begins from an empty (or seeded) store.
//!
//! # Routes
//!
//! - `GET /health`
//! - `GET|POST /api/depositions`
//! - `GET|DELETE /api/depositions/:id`
//! - `POST /api/depositions/:id/publish`
//! - `POST /api/depositions/:id/files`
//!
//! # Example
//!
//! ```no_run
//! use fakenodo::{app, DepositionStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:5001").await?;
//!     axum::serve(listener, app(DepositionStore::new())).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use error::{FakenodoError, FakenodoResult};
pub use routes::app;
pub use store::DepositionStore;
