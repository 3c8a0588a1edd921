//! PIX checker routes
//!
//! - `POST /check` - Check the posted model text
//! - `GET /valid/:file_id` - Confirm a stored file exists

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::syntax::check_pix;
use crate::error::{AppError, AppResult};
use crate::features::FeatureState;

pub fn pixchecker_routes() -> Router<FeatureState> {
    Router::new()
        .route("/check", post(check))
        .route("/valid/:file_id", get(valid))
}

/// Bare bodies, not the `ApiResponse` envelope
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum CheckResponse {
    Valid { message: &'static str },
    Invalid { errors: Vec<String> },
}

#[derive(Debug, Serialize)]
struct ValidFile {
    success: bool,
    file_id: i64,
}

#[tracing::instrument(skip(body), fields(len = body.len()))]
async fn check(body: String) -> Response {
    let errors = check_pix(&body);
    if errors.is_empty() {
        let valid = CheckResponse::Valid {
            message: "Valid Model",
        };
        return (StatusCode::OK, Json(valid)).into_response();
    }

    tracing::debug!(count = errors.len(), "model has syntax errors");
    let errors = errors.iter().map(ToString::to_string).collect();
    (StatusCode::BAD_REQUEST, Json(CheckResponse::Invalid { errors })).into_response()
}

#[tracing::instrument(skip(state))]
async fn valid(
    State(state): State<FeatureState>,
    Path(file_id): Path<i64>,
) -> AppResult<Json<ValidFile>> {
    let file = state
        .repos
        .datasets
        .get_file(file_id)
        .await?
        .ok_or_else(|| AppError::not_found("File", file_id))?;

    Ok(Json(ValidFile {
        success: true,
        file_id: file.id,
    }))
}
