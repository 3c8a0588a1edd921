//! Shared utilities and types for feature modules
//!
//! - **pagination**: Common pagination types and helpers
//! - **validation**: Input validation utilities

pub mod pagination;
pub mod validation;

pub use pagination::{Paginated, PaginationMetadata, PaginationParams};
pub use validation::{validate_length, validate_optional_doi, validate_text, ValidationError};
