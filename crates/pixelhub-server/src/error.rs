//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pixelhub_common::HubError;
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::db::DbError;
use crate::features::shared::validation::ValidationError;
use crate::features::zenodo::ZenodoError;

/// Result type alias for handlers and feature commands
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Deposition service returned {status}: {body}")]
    ExternalService { status: u16, body: String },

    #[error("Deposition service unreachable: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[source] DbError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} '{}' not found", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::ExternalService { .. } | AppError::Upstream(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Database(_) | AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalService { .. } | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                "An internal error occurred".to_string()
            },
            AppError::ExternalService { status, ref body } => {
                tracing::warn!(status, body = %body, "Deposition service rejected request");
                self.to_string()
            },
            AppError::Upstream(ref message) => {
                tracing::warn!("Deposition service unreachable: {}", message);
                self.to_string()
            },
            AppError::NotFound(_) | AppError::Validation(_) => self.to_string(),
        };

        (self.status(), Json(ErrorResponse::new(self.code(), message))).into_response()
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => AppError::NotFound(msg),
            DbError::Duplicate(msg) => AppError::Validation(msg),
            other => AppError::Database(other),
        }
    }
}

impl From<HubError> for AppError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::NotFound { .. } => AppError::NotFound(err.to_string()),
            HubError::Validation(msg) => AppError::Validation(msg),
            HubError::ExternalService { status, body } => AppError::ExternalService { status, body },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ZenodoError> for AppError {
    fn from(err: ZenodoError) -> Self {
        match err {
            ZenodoError::UnexpectedStatus { status, body } => AppError::ExternalService { status, body },
            ZenodoError::Http(e) => AppError::Upstream(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::not_found("Dataset", 4).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::ExternalService {
                status: 500,
                body: "boom".to_string()
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_duplicate_maps_to_validation() {
        let err: AppError = DbError::duplicate("Cart item", "7").into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_hub_error_conversion() {
        let err: AppError = HubError::validation("games_count cannot be negative").into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = HubError::not_found("Deposition", "3").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(AppError::not_found("Dataset", 12).to_string(), "Dataset '12' not found");
    }
}
