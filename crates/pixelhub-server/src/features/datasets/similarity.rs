//! Dataset similarity scoring and recommendation ranking

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::Dataset;

/// Pairwise similarity between two datasets. Higher is more similar.
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, target: &Dataset, candidate: &Dataset) -> f64;
}

/// Counts shared authors and tags, plus one for an equal publication type.
///
/// Author names compare exactly; tags compare trimmed and case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedMetadataScorer;

fn normalized_tags(dataset: &Dataset) -> HashSet<String> {
    dataset
        .metadata
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl SimilarityScorer for SharedMetadataScorer {
    fn score(&self, target: &Dataset, candidate: &Dataset) -> f64 {
        let target_authors: HashSet<&str> = target
            .metadata
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        let candidate_authors: HashSet<&str> = candidate
            .metadata
            .authors
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        let shared_authors = target_authors.intersection(&candidate_authors).count();

        let shared_tags = normalized_tags(target)
            .intersection(&normalized_tags(candidate))
            .count();

        let same_type =
            usize::from(target.metadata.publication_type == candidate.metadata.publication_type);

        (shared_authors + shared_tags + same_type) as f64
    }
}

/// A ranked recommendation
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDataset {
    #[serde(flatten)]
    pub dataset: Dataset,
    pub score: f64,
    pub download_count: i64,
}

/// Rank `candidates` against `target` and keep the best `limit`.
///
/// Order is descending by score, then download count, then creation time.
/// The target itself is never returned. Fully tied candidates keep their
/// input order.
pub fn rank(
    target: &Dataset,
    candidates: Vec<Dataset>,
    downloads: &HashMap<i64, i64>,
    scorer: &dyn SimilarityScorer,
    limit: usize,
) -> Vec<ScoredDataset> {
    let mut scored: Vec<ScoredDataset> = candidates
        .into_iter()
        .filter(|d| d.id != target.id)
        .map(|dataset| ScoredDataset {
            score: scorer.score(target, &dataset),
            download_count: downloads.get(&dataset.id).copied().unwrap_or(0),
            dataset,
        })
        .collect();

    scored.sort_by(|a, b| compare_rank(b, a));
    scored.truncate(limit);
    scored
}

fn compare_rank(a: &ScoredDataset, b: &ScoredDataset) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.download_count.cmp(&b.download_count))
        .then_with(|| a.dataset.created_at.cmp(&b.dataset.created_at))
}
