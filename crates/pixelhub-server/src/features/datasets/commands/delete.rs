//! Delete dataset command
//!
//! Removes the dataset with its files, activity records and cart items.
//! Later versions stay in place with a dangling `previous_version_id`.

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDatasetCommand {
    pub dataset_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteDatasetResponse {
    pub dataset_id: i64,
    pub deleted: bool,
}

#[tracing::instrument(skip(repos))]
pub async fn handle(
    repos: &Repositories,
    command: DeleteDatasetCommand,
) -> AppResult<DeleteDatasetResponse> {
    repos.datasets.delete(command.dataset_id).await?;

    tracing::info!(dataset_id = command.dataset_id, "Dataset deleted");

    Ok(DeleteDatasetResponse {
        dataset_id: command.dataset_id,
        deleted: true,
    })
}
