//! Cart model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dataset file placed in a user's cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub file_id: i64,
    pub added_at: DateTime<Utc>,
}
