//! Add file to cart command

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::AppResult;
use crate::models::CartItem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemBody {
    pub file_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCartItemCommand {
    pub user_id: i64,
    pub file_id: i64,
}

/// Fails with a validation error when the file is already in the cart and
/// with not found when the file does not exist.
#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories, command: AddCartItemCommand) -> AppResult<CartItem> {
    let item = repos
        .carts
        .add_item(command.user_id, command.file_id)
        .await?;
    tracing::debug!(item_id = item.id, "File added to cart");
    Ok(item)
}
