//! Record dataset view command
//!
//! A view is recorded once per (dataset, cookie) pair.

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordViewCommand {
    pub dataset_id: i64,
    pub user_id: Option<i64>,
    pub cookie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordViewResponse {
    pub dataset_id: i64,
    pub cookie: String,
    /// False when this cookie had already viewed the dataset
    pub recorded: bool,
}

#[tracing::instrument(skip(repos, command), fields(dataset_id = command.dataset_id))]
pub async fn handle(repos: &Repositories, command: RecordViewCommand) -> AppResult<RecordViewResponse> {
    if repos.datasets.get(command.dataset_id).await?.is_none() {
        return Err(AppError::not_found("Dataset", command.dataset_id));
    }

    let record = repos
        .activity
        .record_view(command.dataset_id, command.user_id, &command.cookie)
        .await?;

    Ok(RecordViewResponse {
        dataset_id: command.dataset_id,
        cookie: command.cookie,
        recorded: record.is_some(),
    })
}
