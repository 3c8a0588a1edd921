//! Publish dataset command
//!
//! Runs the publish workflow of a dataset against the deposition API:
//!
//! 1. load the dataset
//! 2. create a deposition carrying Zenodo-style metadata
//! 3. upload every dataset file by name
//! 4. compute the next DOI from the DOIs already in the registry
//! 5. publish the deposition with that DOI
//! 6. store the deposition id and the DOI the service returned

use pixelhub_common::doi::{fallback_doi, next_doi};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::SiteConfig;
use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::features::zenodo::ZenodoClient;
use crate::models::Dataset;

/// Keyword added to every deposition
pub const PLATFORM_KEYWORD: &str = "pixelhub";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDatasetCommand {
    pub dataset_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDatasetResponse {
    pub dataset_id: i64,
    pub deposition_id: i64,
    pub doi: Option<String>,
    /// Public landing URL of the DOI
    pub doi_url: Option<String>,
    pub uploaded_files: usize,
}

/// Zenodo metadata of a dataset's deposition
pub fn deposition_metadata(dataset: &Dataset) -> Value {
    let meta = &dataset.metadata;

    let mut metadata = Map::new();
    metadata.insert("title".to_string(), json!(meta.title));
    metadata.insert(
        "upload_type".to_string(),
        json!(if meta.publication_type.is_none() {
            "dataset"
        } else {
            "publication"
        }),
    );
    if !meta.publication_type.is_none() {
        metadata.insert(
            "publication_type".to_string(),
            json!(meta.publication_type.as_str()),
        );
    }
    metadata.insert("description".to_string(), json!(meta.description));

    let creators: Vec<Value> = meta
        .authors
        .iter()
        .map(|author| {
            let mut creator = Map::new();
            creator.insert("name".to_string(), json!(author.name));
            if let Some(affiliation) = author.affiliation.as_deref().filter(|a| !a.is_empty()) {
                creator.insert("affiliation".to_string(), json!(affiliation));
            }
            if let Some(orcid) = author.orcid.as_deref().filter(|o| !o.is_empty()) {
                creator.insert("orcid".to_string(), json!(orcid));
            }
            Value::Object(creator)
        })
        .collect();
    metadata.insert("creators".to_string(), Value::Array(creators));

    let mut keywords: Vec<&str> = meta
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    keywords.push(PLATFORM_KEYWORD);
    metadata.insert("keywords".to_string(), json!(keywords));

    metadata.insert("access_right".to_string(), json!("open"));
    metadata.insert("license".to_string(), json!("CC-BY-4.0"));

    Value::Object(metadata)
}

/// Next DOI to assign. A registry failure degrades to the fallback DOI.
pub async fn compute_next_doi(repos: &Repositories) -> String {
    match repos.datasets.dataset_dois().await {
        Ok(dois) => next_doi(dois),
        Err(e) => {
            tracing::warn!(error = %e, "Falling back to default DOI, existing DOIs unavailable");
            fallback_doi()
        },
    }
}

#[tracing::instrument(skip(repos, client, site), fields(dataset_id = command.dataset_id))]
pub async fn handle(
    repos: &Repositories,
    client: &ZenodoClient,
    site: &SiteConfig,
    command: PublishDatasetCommand,
) -> AppResult<PublishDatasetResponse> {
    let dataset = repos
        .datasets
        .get(command.dataset_id)
        .await?
        .ok_or_else(|| AppError::not_found("Dataset", command.dataset_id))?;

    if let Some(doi) = &dataset.metadata.dataset_doi {
        return Err(AppError::validation(format!(
            "Dataset {} is already published with DOI {}",
            dataset.id, doi
        )));
    }

    let deposition = client
        .create_deposition(deposition_metadata(&dataset))
        .await?;

    for file in &dataset.files {
        client.upload_file(deposition.id, &file.name, None).await?;
    }
    tracing::debug!(files = dataset.files.len(), "Dataset files uploaded");

    let doi = compute_next_doi(repos).await;
    let published = client.publish_deposition(deposition.id, Some(&doi)).await?;

    let deposition_id = i64::try_from(published.id).map_err(|_| {
        AppError::Internal(format!("Deposition id {} out of range", published.id))
    })?;
    let updated = repos
        .datasets
        .record_publication(dataset.id, deposition_id, published.doi.clone())
        .await?;

    tracing::info!(
        deposition_id,
        doi = ?updated.metadata.dataset_doi,
        "Dataset published"
    );

    Ok(PublishDatasetResponse {
        dataset_id: updated.id,
        deposition_id,
        doi_url: updated.metadata.dataset_doi.as_deref().map(|d| site.doi_url(d)),
        doi: updated.metadata.dataset_doi,
        uploaded_files: dataset.files.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Author, DatasetKind, DatasetMetadata, PublicationType};
    use chrono::Utc;

    fn dataset(publication_type: PublicationType, tags: Vec<&str>) -> Dataset {
        Dataset {
            id: 1,
            user_id: 1,
            kind: DatasetKind::default(),
            metadata: DatasetMetadata {
                title: "Sprites".to_string(),
                description: "8-bit sprites".to_string(),
                publication_type,
                tags: tags.into_iter().map(String::from).collect(),
                authors: vec![
                    Author::named("Ada"),
                    Author {
                        name: "Grace".to_string(),
                        affiliation: Some("Navy".to_string()),
                        orcid: Some("0000-0001".to_string()),
                    },
                ],
                ..Default::default()
            },
            files: vec![],
            version: 1,
            previous_version_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_metadata_for_plain_dataset() {
        let meta = deposition_metadata(&dataset(PublicationType::None, vec![]));
        assert_eq!(meta["upload_type"], "dataset");
        assert!(meta.get("publication_type").is_none());
        assert_eq!(meta["keywords"], json!(["pixelhub"]));
        assert_eq!(meta["creators"][0], json!({"name": "Ada"}));
        assert_eq!(
            meta["creators"][1],
            json!({"name": "Grace", "affiliation": "Navy", "orcid": "0000-0001"})
        );
        assert_eq!(meta["access_right"], "open");
        assert_eq!(meta["license"], "CC-BY-4.0");
    }

    #[test]
    fn test_metadata_for_publication() {
        let meta = deposition_metadata(&dataset(PublicationType::JournalArticle, vec!["retro", "nes"]));
        assert_eq!(meta["upload_type"], "publication");
        assert_eq!(meta["publication_type"], "article");
        assert_eq!(meta["keywords"], json!(["retro", "nes", "pixelhub"]));
    }

    #[tokio::test]
    async fn test_next_doi_from_empty_registry() {
        let repos = Repositories::in_memory();
        assert_eq!(compute_next_doi(&repos).await, "10.5281/zenodo.1000001");
    }
}
