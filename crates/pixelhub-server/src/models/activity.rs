//! Download and view records
//!
//! Append-only logs keyed by dataset. A view is recorded at most once per
//! (dataset, cookie); downloads are recorded every time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One download of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub id: i64,
    pub dataset_id: i64,
    pub user_id: Option<i64>,
    pub cookie: String,
    pub downloaded_at: DateTime<Utc>,
}

/// One distinct view of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecord {
    pub id: i64,
    pub dataset_id: i64,
    pub user_id: Option<i64>,
    pub cookie: String,
    pub viewed_at: DateTime<Utc>,
}

/// Platform-wide activity totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotals {
    pub downloads: i64,
    pub views: i64,
}
