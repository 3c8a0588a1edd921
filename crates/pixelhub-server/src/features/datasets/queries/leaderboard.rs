//! Download leaderboard query
//!
//! The three most downloaded datasets of the last week or month, keeping
//! only those that carry a dataset DOI.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::models::Dataset;

pub const LEADERBOARD_SIZE: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaderboardPeriod {
    Week,
    Month,
}

impl LeaderboardPeriod {
    /// Parse a period after stripping every non-alphanumeric character.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let cleaned: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        match cleaned.as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(AppError::validation(format!(
                "Unsupported period '{}': use 'week' or 'month'",
                raw
            ))),
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub downloads: i64,
}

#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories, query: LeaderboardQuery) -> AppResult<Vec<LeaderboardEntry>> {
    let period = LeaderboardPeriod::parse(query.period.as_deref().unwrap_or("week"))?;
    let since = Utc::now() - period.window();

    let top = repos
        .activity
        .top_downloaded_since(since, LEADERBOARD_SIZE)
        .await?;

    let mut entries = Vec::with_capacity(top.len());
    for (dataset_id, downloads) in top {
        match repos.datasets.get(dataset_id).await? {
            Some(dataset) if dataset.is_synchronized() => {
                entries.push(LeaderboardEntry { dataset, downloads })
            },
            _ => {},
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing_strips_punctuation() {
        assert_eq!(LeaderboardPeriod::parse("week").unwrap(), LeaderboardPeriod::Week);
        assert_eq!(LeaderboardPeriod::parse("'month';").unwrap(), LeaderboardPeriod::Month);
        assert_eq!(LeaderboardPeriod::parse(" we-ek ").unwrap(), LeaderboardPeriod::Week);
    }

    #[test]
    fn test_unsupported_periods() {
        for raw in ["year", "", "WEEK", "day"] {
            assert!(matches!(
                LeaderboardPeriod::parse(raw),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_windows() {
        assert_eq!(LeaderboardPeriod::Week.window(), Duration::days(7));
        assert_eq!(LeaderboardPeriod::Month.window(), Duration::days(30));
    }
}
