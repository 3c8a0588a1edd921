//! Platform statistics query

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub datasets: i64,
    pub synchronized_datasets: i64,
    pub authors: i64,
    pub files: i64,
    pub downloads: i64,
    pub views: i64,
}

#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories) -> AppResult<PlatformStats> {
    let counts = repos.datasets.counts().await?;
    let totals = repos.activity.totals().await?;

    Ok(PlatformStats {
        datasets: counts.datasets,
        synchronized_datasets: counts.synchronized,
        authors: counts.authors,
        files: counts.files,
        downloads: totals.downloads,
        views: totals.views,
    })
}
