//! Get dataset query

use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::models::Dataset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDatasetQuery {
    pub dataset_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDatasetResponse {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub download_count: i64,
    pub total_size: i64,
    pub doi_url: Option<String>,
}

#[tracing::instrument(skip(repos, site))]
pub async fn handle(
    repos: &Repositories,
    site: &SiteConfig,
    query: GetDatasetQuery,
) -> AppResult<GetDatasetResponse> {
    let dataset = repos
        .datasets
        .get(query.dataset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Dataset", query.dataset_id))?;
    let download_count = repos.activity.download_count(dataset.id).await?;

    Ok(GetDatasetResponse {
        download_count,
        total_size: dataset.total_size(),
        doi_url: dataset.metadata.dataset_doi.as_deref().map(|d| site.doi_url(d)),
        dataset,
    })
}
