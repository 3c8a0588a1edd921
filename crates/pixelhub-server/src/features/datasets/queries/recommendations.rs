//! Dataset recommendations query

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::features::datasets::similarity::{rank, ScoredDataset, SimilarityScorer};

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;
pub const MAX_RECOMMENDATION_LIMIT: usize = 50;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationsParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsQuery {
    pub dataset_id: i64,
    pub limit: usize,
}

impl RecommendationsQuery {
    pub fn new(dataset_id: i64, params: RecommendationsParams) -> Self {
        Self {
            dataset_id,
            limit: params
                .limit
                .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
                .min(MAX_RECOMMENDATION_LIMIT),
        }
    }
}

#[tracing::instrument(skip(repos, scorer))]
pub async fn handle(
    repos: &Repositories,
    scorer: &dyn SimilarityScorer,
    query: RecommendationsQuery,
) -> AppResult<Vec<ScoredDataset>> {
    let target = repos
        .datasets
        .get(query.dataset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Dataset", query.dataset_id))?;

    let candidates = repos.datasets.list_all().await?;
    let downloads = repos.activity.download_counts().await?;

    let ranked = rank(&target, candidates, &downloads, scorer, query.limit);
    tracing::debug!(count = ranked.len(), "Recommendations ranked");
    Ok(ranked)
}
