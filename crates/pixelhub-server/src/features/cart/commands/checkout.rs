//! Cart checkout command
//!
//! Bundles the files in a user's cart into a new root dataset and empties
//! the cart in the same repository operation. The new dataset owns copies
//! of the files.

use serde::{Deserialize, Serialize};

use crate::db::Repositories;
use crate::error::{AppError, AppResult};
use crate::features::datasets::commands::create::normalize_tags;
use crate::features::shared::validation::{validate_length, validate_text};
use crate::models::{
    Author, Dataset, DatasetCapabilities, DatasetKind, DatasetMetadata, NewDataset,
    NewDatasetFile, PublicationType,
};

pub const MAX_CHECKOUT_TITLE_LENGTH: usize = 150;
pub const MAX_CHECKOUT_DESCRIPTION_LENGTH: usize = 1000;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publication_type: PublicationType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub kind: Option<DatasetKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutCommand {
    pub user_id: i64,
    #[serde(flatten)]
    pub body: CheckoutBody,
}

impl CheckoutCommand {
    pub fn validate(&self) -> AppResult<()> {
        validate_text(&self.body.title, "Dataset name", MAX_CHECKOUT_TITLE_LENGTH)?;
        validate_length(
            &self.body.description,
            "Description",
            MAX_CHECKOUT_DESCRIPTION_LENGTH,
        )?;
        if let Some(kind) = &self.body.kind {
            kind.validate_domain()?;
        }
        Ok(())
    }
}

#[tracing::instrument(skip(repos, command), fields(user_id = command.user_id))]
pub async fn handle(repos: &Repositories, command: CheckoutCommand) -> AppResult<Dataset> {
    command.validate()?;

    let items = repos.carts.items(command.user_id).await?;
    if items.is_empty() {
        return Err(AppError::validation("Cart is empty"));
    }

    let mut files = Vec::with_capacity(items.len());
    for item in &items {
        let file = repos
            .datasets
            .get_file(item.file_id)
            .await?
            .ok_or_else(|| AppError::not_found("File", item.file_id))?;
        files.push(NewDatasetFile::from(&file));
    }

    let body = command.body;
    let dataset = repos
        .carts
        .checkout(
            command.user_id,
            NewDataset {
                user_id: command.user_id,
                kind: body.kind.unwrap_or_default(),
                metadata: DatasetMetadata {
                    title: body.title.trim().to_string(),
                    description: body.description,
                    publication_type: body.publication_type,
                    tags: normalize_tags(body.tags),
                    authors: body.authors,
                    ..Default::default()
                },
                files,
                version: 1,
                previous_version_id: None,
            },
        )
        .await?;

    tracing::info!(
        dataset_id = dataset.id,
        files = dataset.files.len(),
        "Dataset created from cart"
    );

    Ok(dataset)
}
