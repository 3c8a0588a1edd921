//! Cart API routes
//!
//! - `GET /api/v1/carts/:user_id` - View a cart
//! - `DELETE /api/v1/carts/:user_id` - Clear a cart
//! - `POST /api/v1/carts/:user_id/items` - Add a file (`{"file_id": ..}`)
//! - `DELETE /api/v1/carts/:user_id/items/:file_id` - Remove a file
//! - `POST /api/v1/carts/:user_id/checkout` - Create a dataset from the cart

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};

use super::commands::{
    AddCartItemBody, AddCartItemCommand, CheckoutBody, CheckoutCommand, ClearCartCommand,
    RemoveCartItemCommand,
};
use super::queries::ViewCartQuery;
use crate::api::response::ApiResponse;
use crate::error::AppResult;
use crate::features::FeatureState;

pub fn cart_routes() -> Router<FeatureState> {
    Router::new()
        .route("/:user_id", get(view_cart).delete(clear_cart))
        .route("/:user_id/items", post(add_item))
        .route("/:user_id/items/:file_id", delete(remove_item))
        .route("/:user_id/checkout", post(checkout))
}

#[tracing::instrument(skip(state))]
async fn view_cart(
    State(state): State<FeatureState>,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {
    let view = super::queries::view::handle(&state.repos, ViewCartQuery { user_id }).await?;
    Ok(ApiResponse::success(view).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn add_item(
    State(state): State<FeatureState>,
    Path(user_id): Path<i64>,
    Json(body): Json<AddCartItemBody>,
) -> AppResult<Response> {
    let item = super::commands::add_item::handle(
        &state.repos,
        AddCartItemCommand {
            user_id,
            file_id: body.file_id,
        },
    )
    .await?;
    Ok(ApiResponse::success(item).with_status(StatusCode::CREATED))
}

#[tracing::instrument(skip(state))]
async fn remove_item(
    State(state): State<FeatureState>,
    Path((user_id, file_id)): Path<(i64, i64)>,
) -> AppResult<Response> {
    let response = super::commands::remove_item::handle(
        &state.repos,
        RemoveCartItemCommand { user_id, file_id },
    )
    .await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state))]
async fn clear_cart(
    State(state): State<FeatureState>,
    Path(user_id): Path<i64>,
) -> AppResult<Response> {
    let response =
        super::commands::remove_item::clear(&state.repos, ClearCartCommand { user_id }).await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

#[tracing::instrument(skip(state, body))]
async fn checkout(
    State(state): State<FeatureState>,
    Path(user_id): Path<i64>,
    Json(body): Json<CheckoutBody>,
) -> AppResult<Response> {
    let dataset =
        super::commands::checkout::handle(&state.repos, CheckoutCommand { user_id, body }).await?;
    Ok(ApiResponse::success(dataset).with_status(StatusCode::CREATED))
}
