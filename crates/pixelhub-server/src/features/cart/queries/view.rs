//! View cart query

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::AppResult;
use crate::models::DatasetFile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewCartQuery {
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: i64,
    pub added_at: DateTime<Utc>,
    pub file: DatasetFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub user_id: i64,
    pub items: Vec<CartLine>,
    pub total_size: i64,
}

#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories, query: ViewCartQuery) -> AppResult<CartView> {
    let items = repos.carts.items(query.user_id).await?;

    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        match repos.datasets.get_file(item.file_id).await? {
            Some(file) => lines.push(CartLine {
                item_id: item.id,
                added_at: item.added_at,
                file,
            }),
            None => tracing::warn!(file_id = item.file_id, "Cart item references a missing file"),
        }
    }

    Ok(CartView {
        user_id: query.user_id,
        total_size: lines.iter().map(|l| l.file.size).sum(),
        items: lines,
    })
}
