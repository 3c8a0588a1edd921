//! Deposition API routes
//!
//! # Route Structure
//!
//! - `GET /health` - Liveness check
//! - `GET /api/depositions` - List all depositions
//! - `POST /api/depositions` - Create a draft deposition
//! - `GET /api/depositions/:id` - Get a single deposition
//! - `DELETE /api/depositions/:id` - Delete a deposition and its files
//! - `POST /api/depositions/:id/publish` - Publish, assigning a DOI
//! - `POST /api/depositions/:id/files` - Attach a file (multipart or form)

use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use pixelhub_common::checksum::md5_hex;
use pixelhub_common::deposition::{NewDeposition, PublishRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::{FakenodoError, FakenodoResult};
use crate::store::DepositionStore;

/// Build the fakenodo application around a store.
pub fn app(store: DepositionStore) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/depositions", deposition_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

fn deposition_routes() -> Router<DepositionStore> {
    Router::new()
        .route("/", get(list_depositions).post(create_deposition))
        .route("/:id", get(get_deposition).delete(delete_deposition))
        .route("/:id/publish", post(publish_deposition))
        .route("/:id/files", post(upload_file))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[tracing::instrument(skip(store))]
async fn list_depositions(State(store): State<DepositionStore>) -> Response {
    Json(store.list().await).into_response()
}

/// Create a draft deposition. A missing or non-JSON body yields an empty
/// title and description.
#[tracing::instrument(skip(store, payload))]
async fn create_deposition(
    State(store): State<DepositionStore>,
    payload: Option<Json<Value>>,
) -> Response {
    let payload = payload.map(|Json(value)| value).unwrap_or_else(|| json!({}));
    let deposition = store.create(NewDeposition::from_payload(&payload)).await;

    (StatusCode::CREATED, Json(deposition)).into_response()
}

#[tracing::instrument(skip(store))]
async fn get_deposition(
    State(store): State<DepositionStore>,
    Path(id): Path<u64>,
) -> FakenodoResult<Response> {
    let deposition = store.get(id).await.ok_or(FakenodoError::NotFound(id))?;
    Ok(Json(deposition).into_response())
}

#[tracing::instrument(skip(store))]
async fn delete_deposition(
    State(store): State<DepositionStore>,
    Path(id): Path<u64>,
) -> FakenodoResult<StatusCode> {
    store.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(store, body))]
async fn publish_deposition(
    State(store): State<DepositionStore>,
    Path(id): Path<u64>,
    body: Option<Json<PublishRequest>>,
) -> FakenodoResult<Response> {
    let doi = body.and_then(|Json(request)| request.doi);
    let deposition = store.publish(id, doi).await?;
    Ok(Json(deposition).into_response())
}

#[derive(Debug, Deserialize)]
struct FileForm {
    #[serde(default)]
    name: Option<String>,
}

/// A file upload reduced to what the store records.
#[derive(Debug, Default)]
struct Upload {
    name: Option<String>,
    bytes: Vec<u8>,
}

/// Attach a file to a deposition.
///
/// Accepts `multipart/form-data` with a `name` text field and/or a `file`
/// part (its file name is used when `name` is absent), or a urlencoded
/// form with a `name` field.
#[tracing::instrument(skip(store, request))]
async fn upload_file(
    State(store): State<DepositionStore>,
    Path(id): Path<u64>,
    request: Request,
) -> FakenodoResult<Response> {
    if store.get(id).await.is_none() {
        return Err(FakenodoError::NotFound(id));
    }

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"));

    let upload = if is_multipart {
        read_multipart(request).await?
    } else {
        let Form(form) = Form::<FileForm>::from_request(request, &())
            .await
            .map_err(|e| FakenodoError::MalformedUpload(e.body_text()))?;
        Upload {
            name: form.name,
            bytes: Vec::new(),
        }
    };

    let name = upload
        .name
        .filter(|name| !name.trim().is_empty())
        .ok_or(FakenodoError::MissingFileName)?;

    let file = store
        .add_file(id, name, upload.bytes.len() as u64, md5_hex(&upload.bytes))
        .await?;

    Ok((StatusCode::CREATED, Json(file)).into_response())
}

async fn read_multipart(request: Request) -> FakenodoResult<Upload> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| FakenodoError::MalformedUpload(e.body_text()))?;

    let mut upload = Upload::default();
    let mut file_name = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FakenodoError::MalformedUpload(e.body_text()))?
    {
        match field.name() {
            Some("name") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| FakenodoError::MalformedUpload(e.body_text()))?;
                upload.name = Some(text);
            },
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| FakenodoError::MalformedUpload(e.body_text()))?;
                upload.bytes = bytes.to_vec();
            },
            _ => {},
        }
    }

    if upload.name.is_none() {
        upload.name = file_name;
    }
    Ok(upload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_builds() {
        let router = app(DepositionStore::new());
        assert!(format!("{:?}", router).contains("Router"));
    }
}
