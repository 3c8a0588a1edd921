//! Record dataset download command
//!
//! Appends a download record. Anonymous callers are identified by a cookie;
//! one is generated when the caller does not send any.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Repositories;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityBody {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub cookie: Option<String>,
}

impl ActivityBody {
    /// The sent cookie, or a fresh one.
    pub fn cookie_or_new(&self) -> String {
        self.cookie
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDownloadCommand {
    pub dataset_id: i64,
    pub user_id: Option<i64>,
    pub cookie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDownloadResponse {
    pub dataset_id: i64,
    pub cookie: String,
    pub download_count: i64,
}

#[tracing::instrument(skip(repos, command), fields(dataset_id = command.dataset_id))]
pub async fn handle(
    repos: &Repositories,
    command: RecordDownloadCommand,
) -> AppResult<RecordDownloadResponse> {
    if repos.datasets.get(command.dataset_id).await?.is_none() {
        return Err(AppError::not_found("Dataset", command.dataset_id));
    }

    let record = repos
        .activity
        .record_download(command.dataset_id, command.user_id, &command.cookie)
        .await?;
    let download_count = repos.activity.download_count(command.dataset_id).await?;

    tracing::debug!(download_count, "Download recorded");

    Ok(RecordDownloadResponse {
        dataset_id: record.dataset_id,
        cookie: record.cookie,
        download_count,
    })
}
