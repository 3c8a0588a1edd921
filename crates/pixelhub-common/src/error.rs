//! Error types shared across PixelHub crates

use thiserror::Error;

/// Result type alias for PixelHub operations
pub type Result<T> = std::result::Result<T, HubError>;

/// Main error type for PixelHub
#[derive(Error, Debug)]
pub enum HubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    /// The archival service answered with an unexpected status.
    #[error("External service error (status {status}): {body}")]
    ExternalService { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HubError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn external(status: u16, body: impl Into<String>) -> Self {
        Self::ExternalService {
            status,
            body: body.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
