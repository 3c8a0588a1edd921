//! Deposition API routes
//!
//! - `GET /api/v1/zenodo/connection?full=false` - connection check

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};

use super::queries::ConnectionQuery;
use crate::api::response::ApiResponse;
use crate::features::FeatureState;

pub fn zenodo_routes() -> Router<FeatureState> {
    Router::new().route("/connection", get(connection))
}

#[tracing::instrument(skip(state))]
async fn connection(
    State(state): State<FeatureState>,
    Query(query): Query<ConnectionQuery>,
) -> ApiResponse<super::ConnectionReport> {
    let report = super::queries::connection::handle(&state.zenodo, query).await;
    tracing::debug!(success = report.success, "Connection check finished");
    ApiResponse::success(report)
}
