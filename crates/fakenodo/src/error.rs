//! Fakenodo error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type FakenodoResult<T> = std::result::Result<T, FakenodoError>;

#[derive(Error, Debug)]
pub enum FakenodoError {
    #[error("Deposition {0} not found")]
    NotFound(u64),

    #[error("Missing file name")]
    MissingFileName,

    #[error("Malformed upload: {0}")]
    MalformedUpload(String),
}

impl IntoResponse for FakenodoError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            FakenodoError::NotFound(id) => {
                tracing::debug!(deposition_id = id, "Deposition not found");
                (StatusCode::NOT_FOUND, "Not found".to_string())
            },
            FakenodoError::MissingFileName => (StatusCode::BAD_REQUEST, self.to_string()),
            FakenodoError::MalformedUpload(ref reason) => {
                tracing::warn!(reason = %reason, "Rejected malformed upload");
                (StatusCode::BAD_REQUEST, self.to_string())
            },
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
