//! List datasets query

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::AppResult;
use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::models::Dataset;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDatasetsQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

impl ListDatasetsQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.per_page)
    }
}

/// Newest datasets first.
#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories, query: ListDatasetsQuery) -> AppResult<Paginated<Dataset>> {
    let params = query.pagination();
    params.validate()?;

    let total = repos.datasets.count().await?;
    let items = repos
        .datasets
        .list_page(params.offset(), params.per_page())
        .await?;

    Ok(Paginated::from_items(items, &params, total))
}
