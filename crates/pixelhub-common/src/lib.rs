//! PixelHub Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the PixelHub workspace.
//!
//! # Overview
//!
//! This crate provides functionality used by both the PixelHub server and the
//! fakenodo deposition service:
//!
//! - **Error Handling**: Common error type and result alias
//! - **DOI**: Zenodo-style DOI parsing and sequential allocation
//! - **Deposition**: Wire types of the deposition API
//! - **Checksums**: MD5 digests for uploaded artifacts
//! - **Logging**: Subscriber setup shared by every binary
//! - **Shutdown**: Ctrl+C / SIGTERM handling for graceful server shutdown
//!
//! # Example
//!
//! ```
//! use pixelhub_common::doi::next_doi;
//!
//! let existing = [Some("10.5281/zenodo.1000005"), None, Some("bad-format")];
//! assert_eq!(next_doi(existing), "10.5281/zenodo.1000006");
//! ```

pub mod checksum;
pub mod deposition;
pub mod doi;
pub mod error;
pub mod logging;
pub mod shutdown;

// Re-export commonly used types
pub use error::{HubError, Result};
