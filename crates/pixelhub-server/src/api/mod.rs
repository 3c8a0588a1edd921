//! HTTP surface of the server
//!
//! Mounts the feature routers under `/api/v1`, the badge routes at the
//! root and the middleware stack around both.

pub mod response;

use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::compression::CompressionLayer;

use crate::config::CorsConfig;
use crate::features::{self, FeatureState};
use crate::middleware;

/// Create the application router with all routes and middleware
pub fn create_router(state: FeatureState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", features::router(state.clone()))
        .merge(features::badge_router(state))
        // Layers apply from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "PixelHub Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}
