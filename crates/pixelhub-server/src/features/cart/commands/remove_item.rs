//! Remove file from cart and clear cart commands

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveCartItemCommand {
    pub user_id: i64,
    pub file_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearCartCommand {
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartRemovalResponse {
    pub user_id: i64,
    pub removed: u64,
}

#[tracing::instrument(skip(repos))]
pub async fn handle(
    repos: &Repositories,
    command: RemoveCartItemCommand,
) -> AppResult<CartRemovalResponse> {
    repos
        .carts
        .remove_item(command.user_id, command.file_id)
        .await?;
    Ok(CartRemovalResponse {
        user_id: command.user_id,
        removed: 1,
    })
}

#[tracing::instrument(skip(repos))]
pub async fn clear(repos: &Repositories, command: ClearCartCommand) -> AppResult<CartRemovalResponse> {
    let removed = repos.carts.clear(command.user_id).await?;
    tracing::debug!(removed, "Cart cleared");
    Ok(CartRemovalResponse {
        user_id: command.user_id,
        removed,
    })
}
