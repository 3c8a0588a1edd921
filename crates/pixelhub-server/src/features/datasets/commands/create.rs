//! Create dataset command
//!
//! Creates either a root dataset (version 1) or, when `parent_id` is set, a
//! new version of an existing dataset. A new version starts as a copy of
//! its parent's metadata, files and kind; every field present on the
//! command overrides the copied value. Publication state (dataset DOI and
//! deposition id) is never inherited.

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::features::shared::validation::{
    validate_non_negative, validate_optional_doi, validate_text, ValidationError,
};
use crate::models::{
    Author, Dataset, DatasetCapabilities, DatasetKind, DatasetMetadata, NewDataset,
    NewDatasetFile, PublicationType,
};

pub const MAX_TITLE_LENGTH: usize = 256;
pub const MAX_FILE_NAME_LENGTH: usize = 255;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDatasetCommand {
    pub user_id: i64,

    /// Create a new version of this dataset
    #[serde(default)]
    pub parent_id: Option<i64>,

    #[serde(default)]
    pub kind: Option<DatasetKind>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub publication_type: Option<PublicationType>,

    #[serde(default)]
    pub publication_doi: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub authors: Option<Vec<Author>>,

    #[serde(default)]
    pub files: Option<Vec<NewDatasetFile>>,
}

impl CreateDatasetCommand {
    pub fn validate(&self) -> AppResult<()> {
        match &self.title {
            Some(title) => validate_text(title, "Title", MAX_TITLE_LENGTH)?,
            None if self.parent_id.is_none() => {
                return Err(ValidationError::Required { field: "Title" }.into())
            },
            None => {},
        }

        validate_optional_doi(self.publication_doi.as_deref(), "Publication DOI")?;

        if let Some(authors) = &self.authors {
            for author in authors {
                validate_text(&author.name, "Author name", MAX_TITLE_LENGTH)?;
            }
        }

        if let Some(files) = &self.files {
            validate_files(files)?;
        }

        if let Some(kind) = &self.kind {
            kind.validate_domain()?;
        }

        Ok(())
    }

    /// Fold the command over the parent's values.
    fn into_new_dataset(self, parent: Option<&Dataset>) -> NewDataset {
        let (base_kind, base_metadata, base_files, version) = match parent {
            Some(parent) => (
                parent.kind.clone(),
                DatasetMetadata {
                    dataset_doi: None,
                    deposition_id: None,
                    ..parent.metadata.clone()
                },
                parent.files.iter().map(NewDatasetFile::from).collect(),
                parent.version + 1,
            ),
            None => (DatasetKind::default(), DatasetMetadata::default(), Vec::new(), 1),
        };

        NewDataset {
            user_id: self.user_id,
            kind: self.kind.unwrap_or(base_kind),
            metadata: DatasetMetadata {
                title: self
                    .title
                    .map(|t| t.trim().to_string())
                    .unwrap_or(base_metadata.title),
                description: self.description.unwrap_or(base_metadata.description),
                publication_type: self
                    .publication_type
                    .unwrap_or(base_metadata.publication_type),
                publication_doi: self.publication_doi.or(base_metadata.publication_doi),
                dataset_doi: None,
                deposition_id: None,
                tags: self.tags.map(normalize_tags).unwrap_or(base_metadata.tags),
                authors: self.authors.unwrap_or(base_metadata.authors),
            },
            files: self.files.unwrap_or(base_files),
            version,
            previous_version_id: parent.map(|p| p.id),
        }
    }
}

pub fn validate_files(files: &[NewDatasetFile]) -> AppResult<()> {
    for file in files {
        validate_text(&file.name, "File name", MAX_FILE_NAME_LENGTH)?;
        validate_non_negative(file.size, "File size")?;
    }
    Ok(())
}

/// Trim tags and drop empty ones.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[tracing::instrument(skip(repos, command), fields(user_id = command.user_id, parent_id = ?command.parent_id))]
pub async fn handle(repos: &Repositories, command: CreateDatasetCommand) -> AppResult<Dataset> {
    command.validate()?;

    let parent = match command.parent_id {
        Some(parent_id) => Some(
            repos
                .datasets
                .get(parent_id)
                .await?
                .ok_or_else(|| AppError::not_found("Dataset", parent_id))?,
        ),
        None => None,
    };

    let new = command.into_new_dataset(parent.as_ref());
    new.kind.validate_domain()?;

    let dataset = repos.datasets.insert(new).await?;

    tracing::info!(
        dataset_id = dataset.id,
        version = dataset.version,
        files = dataset.files.len(),
        "Dataset created"
    );

    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PixPayload;

    fn root_command() -> CreateDatasetCommand {
        CreateDatasetCommand {
            user_id: 1,
            title: Some("Sprites".to_string()),
            tags: Some(vec![" retro ".to_string(), "".to_string()]),
            authors: Some(vec![Author::named("Ada")]),
            files: Some(vec![NewDatasetFile {
                name: "a.pix".to_string(),
                size: 10,
                checksum: "aa".to_string(),
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn test_root_requires_title() {
        let cmd = CreateDatasetCommand {
            user_id: 1,
            ..Default::default()
        };
        assert!(matches!(cmd.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_version_may_omit_title() {
        let cmd = CreateDatasetCommand {
            user_id: 1,
            parent_id: Some(3),
            ..Default::default()
        };
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn test_negative_file_size_rejected() {
        let mut cmd = root_command();
        cmd.files = Some(vec![NewDatasetFile {
            name: "x".to_string(),
            size: -1,
            checksum: String::new(),
        }]);
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn test_negative_games_count_rejected() {
        let mut cmd = root_command();
        cmd.kind = Some(DatasetKind::Pix(PixPayload {
            games_count: Some(-4),
            encoding: None,
        }));
        assert!(cmd.validate().is_err());
    }

    #[tokio::test]
    async fn test_create_root_dataset() {
        let repos = Repositories::in_memory();
        let dataset = handle(&repos, root_command()).await.unwrap();

        assert_eq!(dataset.version, 1);
        assert_eq!(dataset.previous_version_id, None);
        assert_eq!(dataset.metadata.tags, vec!["retro".to_string()]);
        assert_eq!(dataset.files.len(), 1);
    }

    #[tokio::test]
    async fn test_new_version_inherits_and_overrides() {
        let repos = Repositories::in_memory();
        let root = handle(&repos, root_command()).await.unwrap();
        repos
            .datasets
            .record_publication(root.id, 9, Some("10.5281/zenodo.1000001".to_string()))
            .await
            .unwrap();

        let child = handle(
            &repos,
            CreateDatasetCommand {
                user_id: 2,
                parent_id: Some(root.id),
                description: Some("Second pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(child.version, 2);
        assert_eq!(child.previous_version_id, Some(root.id));
        assert_eq!(child.title(), "Sprites");
        assert_eq!(child.metadata.description, "Second pass");
        assert_eq!(child.metadata.authors, root.metadata.authors);
        assert_eq!(child.files.len(), 1);
        assert_ne!(child.files[0].id, root.files[0].id);
        assert_eq!(child.metadata.dataset_doi, None);
        assert_eq!(child.metadata.deposition_id, None);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let repos = Repositories::in_memory();
        let err = handle(
            &repos,
            CreateDatasetCommand {
                user_id: 1,
                parent_id: Some(42),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
