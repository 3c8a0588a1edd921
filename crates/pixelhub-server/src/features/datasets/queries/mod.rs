pub mod compare;
pub mod get;
pub mod history;
pub mod leaderboard;
pub mod list;
pub mod recommendations;
pub mod stats;

pub use compare::{CompareDatasetsQuery, DatasetComparison, FileDiff, MetadataChange};
pub use get::{GetDatasetQuery, GetDatasetResponse};
pub use history::{resolve_history, DatasetHistoryQuery};
pub use leaderboard::{LeaderboardEntry, LeaderboardPeriod, LeaderboardQuery};
pub use list::ListDatasetsQuery;
pub use recommendations::{RecommendationsParams, RecommendationsQuery};
pub use stats::PlatformStats;
