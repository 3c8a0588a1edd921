//! Dataset API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/datasets` - List datasets, newest first
//! - `POST /api/v1/datasets` - Create a dataset or a new version of one
//! - `GET /api/v1/datasets/leaderboard?period=week` - Most downloaded datasets
//! - `GET /api/v1/datasets/:id` - Get a dataset with its download count
//! - `DELETE /api/v1/datasets/:id` - Delete a dataset
//! - `GET /api/v1/datasets/:id/history` - Version history
//! - `GET /api/v1/datasets/:id/recommendations?limit=5` - Similar datasets
//! - `GET /api/v1/datasets/:id/compare/:other_id` - Diff two datasets
//! - `POST /api/v1/datasets/:id/downloads` - Record a download
//! - `POST /api/v1/datasets/:id/views` - Record a view
//! - `POST /api/v1/datasets/:id/publish` - Publish to the deposition service
//! - `GET /api/v1/stats` - Platform statistics

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::commands::{
    ActivityBody, CreateDatasetCommand, DeleteDatasetCommand, RecordDownloadCommand,
    RecordViewCommand,
};
use super::queries::{
    CompareDatasetsQuery, DatasetHistoryQuery, GetDatasetQuery, LeaderboardQuery,
    ListDatasetsQuery, RecommendationsParams, RecommendationsQuery,
};
use crate::api::response::ApiResponse;
use crate::error::AppResult;
use crate::features::zenodo::commands::{publish, PublishDatasetCommand};
use crate::features::FeatureState;

pub fn datasets_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_datasets).post(create_dataset))
        .route("/leaderboard", get(leaderboard))
        .route("/:id", get(get_dataset).delete(delete_dataset))
        .route("/:id/history", get(history))
        .route("/:id/recommendations", get(recommendations))
        .route("/:id/compare/:other_id", get(compare))
        .route("/:id/downloads", post(record_download))
        .route("/:id/views", post(record_view))
        .route("/:id/publish", post(publish_dataset))
}

pub fn stats_routes() -> Router<FeatureState> {
    Router::new().route("/", get(stats))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

#[tracing::instrument(skip(state, command), fields(user_id = command.user_id))]
async fn create_dataset(
    State(state): State<FeatureState>,
    Json(command): Json<CreateDatasetCommand>,
) -> AppResult<Response> {
    let dataset = super::commands::create::handle(&state.repos, command).await?;
    Ok(ApiResponse::success(dataset).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(state))]
async fn delete_dataset(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let response =
        super::commands::delete::handle(&state.repos, DeleteDatasetCommand { dataset_id: id })
            .await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state, body))]
async fn record_download(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
    body: Option<Json<ActivityBody>>,
) -> AppResult<Response> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let command = RecordDownloadCommand {
        dataset_id: id,
        user_id: body.user_id,
        cookie: body.cookie_or_new(),
    };
    let response = super::commands::record_download::handle(&state.repos, command).await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(state, body))]
async fn record_view(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
    body: Option<Json<ActivityBody>>,
) -> AppResult<Response> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let command = RecordViewCommand {
        dataset_id: id,
        user_id: body.user_id,
        cookie: body.cookie_or_new(),
    };
    let response = super::commands::record_view::handle(&state.repos, command).await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn publish_dataset(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let response = publish::handle(
        &state.repos,
        &state.zenodo,
        &state.site,
        PublishDatasetCommand { dataset_id: id },
    )
    .await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(state))]
async fn list_datasets(
    State(state): State<FeatureState>,
    Query(query): Query<ListDatasetsQuery>,
) -> AppResult<Response> {
    let page = super::queries::list::handle(&state.repos, query).await?;

    tracing::debug!(
        count = page.items.len(),
        total = page.pagination.total,
        "Datasets listed via API"
    );

    let meta = json!({ "pagination": page.pagination });
    Ok(ApiResponse::success_with_meta(page.items, meta).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn get_dataset(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let response =
        super::queries::get::handle(&state.repos, &state.site, GetDatasetQuery { dataset_id: id })
            .await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn history(State(state): State<FeatureState>, Path(id): Path<i64>) -> AppResult<Response> {
    let versions =
        super::queries::history::handle(&state.repos, DatasetHistoryQuery { dataset_id: id })
            .await?;
    let meta = json!({ "count": versions.len() });
    Ok(ApiResponse::success_with_meta(versions, meta).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn recommendations(
    State(state): State<FeatureState>,
    Path(id): Path<i64>,
    Query(params): Query<RecommendationsParams>,
) -> AppResult<Response> {
    let query = RecommendationsQuery::new(id, params);
    let ranked =
        super::queries::recommendations::handle(&state.repos, state.similarity.as_ref(), query)
            .await?;
    Ok(ApiResponse::success(ranked).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn compare(
    State(state): State<FeatureState>,
    Path((id, other_id)): Path<(i64, i64)>,
) -> AppResult<Response> {
    let comparison = super::queries::compare::handle(
        &state.repos,
        CompareDatasetsQuery {
            old_id: id,
            new_id: other_id,
        },
    )
    .await?;
    Ok(ApiResponse::success(comparison).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn leaderboard(
    State(state): State<FeatureState>,
    Query(query): Query<LeaderboardQuery>,
) -> AppResult<Response> {
    let entries = super::queries::leaderboard::handle(&state.repos, query).await?;
    Ok(ApiResponse::success(entries).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn stats(State(state): State<FeatureState>) -> AppResult<Response> {
    let stats = super::queries::stats::handle(&state.repos).await?;
    Ok(ApiResponse::success(stats).with_status(StatusCode::OK))
}
