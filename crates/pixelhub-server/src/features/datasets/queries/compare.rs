//! Dataset comparison query
//!
//! Diffs two datasets: a list of changed metadata fields and a file-level
//! diff keyed by file name, where a file is modified when its checksum
//! changed.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::models::{Dataset, DatasetFile};

const EMPTY: &str = "-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareDatasetsQuery {
    pub old_id: i64,
    pub new_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataChange {
    pub field: String,
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedFile {
    pub old: DatasetFile,
    pub new: DatasetFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    pub added: Vec<DatasetFile>,
    pub deleted: Vec<DatasetFile>,
    pub modified: Vec<ModifiedFile>,
    pub unchanged: Vec<DatasetFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetComparison {
    pub old_id: i64,
    pub new_id: i64,
    pub metadata: Vec<MetadataChange>,
    pub files: FileDiff,
}

fn optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| EMPTY.to_string())
}

fn joined<'a>(values: impl IntoIterator<Item = &'a str>) -> String {
    let joined = values.into_iter().collect::<Vec<_>>().join(", ");
    if joined.is_empty() {
        EMPTY.to_string()
    } else {
        joined
    }
}

pub fn compare_metadata(old: &Dataset, new: &Dataset) -> Vec<MetadataChange> {
    let (om, nm) = (&old.metadata, &new.metadata);
    let fields = [
        ("Title", om.title.clone(), nm.title.clone()),
        ("Description", om.description.clone(), nm.description.clone()),
        (
            "Publication Type",
            om.publication_type.display_name().to_string(),
            nm.publication_type.display_name().to_string(),
        ),
        ("Publication DOI", optional(&om.publication_doi), optional(&nm.publication_doi)),
        (
            "Tags",
            joined(om.tags.iter().map(String::as_str)),
            joined(nm.tags.iter().map(String::as_str)),
        ),
    ];

    let mut changes: Vec<MetadataChange> = fields
        .into_iter()
        .filter(|(_, o, n)| o != n)
        .map(|(field, old, new)| MetadataChange {
            field: field.to_string(),
            old,
            new,
        })
        .collect();

    let old_authors: BTreeSet<&str> = om.authors.iter().map(|a| a.name.as_str()).collect();
    let new_authors: BTreeSet<&str> = nm.authors.iter().map(|a| a.name.as_str()).collect();
    if old_authors != new_authors {
        changes.push(MetadataChange {
            field: "Authors".to_string(),
            old: joined(old_authors.difference(&new_authors).copied()),
            new: joined(new_authors.difference(&old_authors).copied()),
        });
    }

    changes
}

pub fn compare_files(old: &Dataset, new: &Dataset) -> FileDiff {
    let old_files: BTreeMap<&str, &DatasetFile> =
        old.files.iter().map(|f| (f.name.as_str(), f)).collect();
    let new_files: BTreeMap<&str, &DatasetFile> =
        new.files.iter().map(|f| (f.name.as_str(), f)).collect();

    let names: BTreeSet<&str> = old_files.keys().chain(new_files.keys()).copied().collect();
    let mut diff = FileDiff::default();

    for name in names {
        match (old_files.get(name), new_files.get(name)) {
            (None, Some(added)) => diff.added.push((*added).clone()),
            (Some(deleted), None) => diff.deleted.push((*deleted).clone()),
            (Some(o), Some(n)) if o.checksum != n.checksum => diff.modified.push(ModifiedFile {
                old: (*o).clone(),
                new: (*n).clone(),
            }),
            (Some(_), Some(n)) => diff.unchanged.push((*n).clone()),
            (None, None) => {},
        }
    }

    diff
}

async fn load(repos: &Repositories, id: i64) -> AppResult<Dataset> {
    repos
        .datasets
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Dataset", id))
}

#[tracing::instrument(skip(repos))]
pub async fn handle(repos: &Repositories, query: CompareDatasetsQuery) -> AppResult<DatasetComparison> {
    let old = load(repos, query.old_id).await?;
    let new = load(repos, query.new_id).await?;

    Ok(DatasetComparison {
        old_id: old.id,
        new_id: new.id,
        metadata: compare_metadata(&old, &new),
        files: compare_files(&old, &new),
    })
}
