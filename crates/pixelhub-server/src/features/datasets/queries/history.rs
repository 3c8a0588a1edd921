//! Version history query
//!
//! Resolves the whole version tree a dataset belongs to: walk parent links
//! up to the root, then collect every descendant of the root breadth first.
//! The result is ordered by version.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::db::{DatasetRepository, DbResult, Repositories};
use crate::error::AppResult;
use crate::models::Dataset;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetHistoryQuery {
    pub dataset_id: i64,
}

/// Full version history of `dataset_id`, root first.
///
/// An unknown id yields an empty history. A dangling parent pointer ends
/// the upward walk at the last dataset that exists. Cyclic links are
/// visited once.
pub async fn resolve_history(datasets: &dyn DatasetRepository, dataset_id: i64) -> DbResult<Vec<Dataset>> {
    let Some(start) = datasets.get(dataset_id).await? else {
        return Ok(Vec::new());
    };

    let mut walked = HashSet::from([start.id]);
    let mut root = start;
    while let Some(parent_id) = root.previous_version_id {
        if !walked.insert(parent_id) {
            tracing::warn!(dataset_id, parent_id, "Cycle in version chain");
            break;
        }
        match datasets.get(parent_id).await? {
            Some(parent) => root = parent,
            None => {
                tracing::debug!(dataset_id = root.id, parent_id, "Dangling parent pointer");
                break;
            },
        }
    }

    let mut seen = HashSet::from([root.id]);
    let mut queue = VecDeque::from([root.id]);
    let mut history = vec![root];

    while let Some(current) = queue.pop_front() {
        for child in datasets.children(current).await? {
            if seen.insert(child.id) {
                queue.push_back(child.id);
                history.push(child);
            }
        }
    }

    history.sort_by_key(|d| (d.version, d.id));
    Ok(history)
}

#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories, query: DatasetHistoryQuery) -> AppResult<Vec<Dataset>> {
    Ok(resolve_history(repos.datasets.as_ref(), query.dataset_id).await?)
}
