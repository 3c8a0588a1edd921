//! Badge routes, served outside `/api/v1`
//!
//! - `GET /badge/:id.svg` - SVG badge as an attachment
//! - `GET /badge/:id/svg` - SVG badge inline
//! - `GET /badge/:id/embed` - Markdown and HTML snippets

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::svg::{embed, render_svg, BadgeData, BadgeEmbed};
use crate::error::{AppError, AppResult};
use crate::features::FeatureState;

pub fn badge_routes() -> Router<FeatureState> {
    Router::new()
        .route("/badge/:id", get(badge_download))
        .route("/badge/:id/svg", get(badge_inline))
        .route("/badge/:id/embed", get(badge_embed))
}

async fn load_badge(state: &FeatureState, dataset_id: i64) -> AppResult<BadgeData> {
    let dataset = state
        .repos
        .datasets
        .get(dataset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Dataset", dataset_id))?;
    let downloads = state.repos.activity.download_count(dataset_id).await?;
    let url = dataset
        .metadata
        .dataset_doi
        .as_deref()
        .map(|doi| state.site.doi_url(doi));

    Ok(BadgeData {
        dataset_id,
        title: dataset.metadata.title,
        downloads,
        doi: dataset.metadata.dataset_doi,
        url,
    })
}

fn svg_response(svg: String, attachment: Option<i64>) -> Response {
    let mut response = (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        svg,
    )
        .into_response();

    if let Some(dataset_id) = attachment {
        let disposition = format!("attachment; filename=\"badge_{}.svg\"", dataset_id);
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    response
}

/// `12.svg` -> `12`
fn parse_svg_file_name(file: &str) -> Option<i64> {
    file.strip_suffix(".svg")?.parse().ok()
}

#[tracing::instrument(skip(state))]
async fn badge_download(
    State(state): State<FeatureState>,
    Path(file): Path<String>,
) -> AppResult<Response> {
    let dataset_id =
        parse_svg_file_name(&file).ok_or_else(|| AppError::not_found("Badge", &file))?;
    let badge = load_badge(&state, dataset_id).await?;
    Ok(svg_response(render_svg(&badge), Some(dataset_id)))
}

#[tracing::instrument(skip(state))]
async fn badge_inline(
    State(state): State<FeatureState>,
    Path(dataset_id): Path<i64>,
) -> AppResult<Response> {
    let badge = load_badge(&state, dataset_id).await?;
    Ok(svg_response(render_svg(&badge), None))
}

#[tracing::instrument(skip(state))]
async fn badge_embed(
    State(state): State<FeatureState>,
    Path(dataset_id): Path<i64>,
) -> AppResult<Json<BadgeEmbed>> {
    let badge = load_badge(&state, dataset_id).await?;
    let svg_url = format!(
        "{}/badge/{}/svg",
        state.site.public_url.trim_end_matches('/'),
        dataset_id
    );
    Ok(Json(embed(&badge, &svg_url)))
}
