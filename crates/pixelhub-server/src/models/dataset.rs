//! Dataset model
//!
//! A dataset is a versioned, publishable unit: metadata, a set of files and
//! a kind-specific payload. Versions link back to their parent through
//! `previous_version_id`; version 1 has no parent.

use chrono::{DateTime, Utc};
use pixelhub_common::HubError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Zenodo publication type vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PublicationType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "annotationcollection")]
    AnnotationCollection,
    #[serde(rename = "book")]
    Book,
    #[serde(rename = "section")]
    BookSection,
    #[serde(rename = "conferencepaper")]
    ConferencePaper,
    #[serde(rename = "datamanagementplan")]
    DataManagementPlan,
    #[serde(rename = "article")]
    JournalArticle,
    #[serde(rename = "patent")]
    Patent,
    #[serde(rename = "preprint")]
    Preprint,
    #[serde(rename = "deliverable")]
    ProjectDeliverable,
    #[serde(rename = "milestone")]
    ProjectMilestone,
    #[serde(rename = "proposal")]
    Proposal,
    #[serde(rename = "report")]
    Report,
    #[serde(rename = "softwaredocumentation")]
    SoftwareDocumentation,
    #[serde(rename = "taxonomictreatment")]
    TaxonomicTreatment,
    #[serde(rename = "technicalnote")]
    TechnicalNote,
    #[serde(rename = "thesis")]
    Thesis,
    #[serde(rename = "workingpaper")]
    WorkingPaper,
    #[serde(rename = "other")]
    Other,
}

impl PublicationType {
    pub const ALL: [PublicationType; 19] = [
        PublicationType::None,
        PublicationType::AnnotationCollection,
        PublicationType::Book,
        PublicationType::BookSection,
        PublicationType::ConferencePaper,
        PublicationType::DataManagementPlan,
        PublicationType::JournalArticle,
        PublicationType::Patent,
        PublicationType::Preprint,
        PublicationType::ProjectDeliverable,
        PublicationType::ProjectMilestone,
        PublicationType::Proposal,
        PublicationType::Report,
        PublicationType::SoftwareDocumentation,
        PublicationType::TaxonomicTreatment,
        PublicationType::TechnicalNote,
        PublicationType::Thesis,
        PublicationType::WorkingPaper,
        PublicationType::Other,
    ];

    /// Wire value, as sent to the deposition API and stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationType::None => "none",
            PublicationType::AnnotationCollection => "annotationcollection",
            PublicationType::Book => "book",
            PublicationType::BookSection => "section",
            PublicationType::ConferencePaper => "conferencepaper",
            PublicationType::DataManagementPlan => "datamanagementplan",
            PublicationType::JournalArticle => "article",
            PublicationType::Patent => "patent",
            PublicationType::Preprint => "preprint",
            PublicationType::ProjectDeliverable => "deliverable",
            PublicationType::ProjectMilestone => "milestone",
            PublicationType::Proposal => "proposal",
            PublicationType::Report => "report",
            PublicationType::SoftwareDocumentation => "softwaredocumentation",
            PublicationType::TaxonomicTreatment => "taxonomictreatment",
            PublicationType::TechnicalNote => "technicalnote",
            PublicationType::Thesis => "thesis",
            PublicationType::WorkingPaper => "workingpaper",
            PublicationType::Other => "other",
        }
    }

    /// Human readable name, e.g. `Journal Article`.
    pub fn display_name(&self) -> &'static str {
        match self {
            PublicationType::None => "None",
            PublicationType::AnnotationCollection => "Annotation Collection",
            PublicationType::Book => "Book",
            PublicationType::BookSection => "Book Section",
            PublicationType::ConferencePaper => "Conference Paper",
            PublicationType::DataManagementPlan => "Data Management Plan",
            PublicationType::JournalArticle => "Journal Article",
            PublicationType::Patent => "Patent",
            PublicationType::Preprint => "Preprint",
            PublicationType::ProjectDeliverable => "Project Deliverable",
            PublicationType::ProjectMilestone => "Project Milestone",
            PublicationType::Proposal => "Proposal",
            PublicationType::Report => "Report",
            PublicationType::SoftwareDocumentation => "Software Documentation",
            PublicationType::TaxonomicTreatment => "Taxonomic Treatment",
            PublicationType::TechnicalNote => "Technical Note",
            PublicationType::Thesis => "Thesis",
            PublicationType::WorkingPaper => "Working Paper",
            PublicationType::Other => "Other",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == PublicationType::None
    }
}

impl FromStr for PublicationType {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        PublicationType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| HubError::validation(format!("Unknown publication type '{}'", s)))
    }
}

impl std::fmt::Display for PublicationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Dataset author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl Author {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            affiliation: None,
            orcid: None,
        }
    }
}

/// Descriptive metadata of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatasetMetadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publication_type: PublicationType,
    #[serde(default)]
    pub publication_doi: Option<String>,
    /// Assigned by the publish workflow
    #[serde(default)]
    pub dataset_doi: Option<String>,
    /// Deposition id on the archival service
    #[serde(default)]
    pub deposition_id: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// A file stored with a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFile {
    pub id: i64,
    pub dataset_id: i64,
    pub name: String,
    /// Size in bytes
    pub size: i64,
    /// Hex-encoded MD5
    pub checksum: String,
}

/// Input of a file attached to a new dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDatasetFile {
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub checksum: String,
}

impl From<&DatasetFile> for NewDatasetFile {
    fn from(file: &DatasetFile) -> Self {
        Self {
            name: file.name.clone(),
            size: file.size,
            checksum: file.checksum.clone(),
        }
    }
}

/// Payload of a pixel-art game dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PixPayload {
    #[serde(default)]
    pub games_count: Option<i32>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Kind-specific part of a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatasetKind {
    Pix(PixPayload),
}

impl Default for DatasetKind {
    fn default() -> Self {
        DatasetKind::Pix(PixPayload::default())
    }
}

/// Behavior every dataset kind provides
pub trait DatasetCapabilities {
    /// Stable tag stored alongside the dataset
    fn type_tag(&self) -> &'static str;

    /// Check kind-specific invariants
    fn validate_domain(&self) -> Result<(), HubError>;
}

impl DatasetCapabilities for PixPayload {
    fn type_tag(&self) -> &'static str {
        "pix"
    }

    fn validate_domain(&self) -> Result<(), HubError> {
        match self.games_count {
            Some(count) if count < 0 => Err(HubError::validation("games_count cannot be negative")),
            _ => Ok(()),
        }
    }
}

impl DatasetCapabilities for DatasetKind {
    fn type_tag(&self) -> &'static str {
        match self {
            DatasetKind::Pix(payload) => payload.type_tag(),
        }
    }

    fn validate_domain(&self) -> Result<(), HubError> {
        match self {
            DatasetKind::Pix(payload) => payload.validate_domain(),
        }
    }
}

/// A dataset with its metadata and files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: i64,
    pub user_id: i64,
    pub kind: DatasetKind,
    pub metadata: DatasetMetadata,
    pub files: Vec<DatasetFile>,
    pub version: i32,
    pub previous_version_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Dataset {
    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn is_synchronized(&self) -> bool {
        self.metadata.dataset_doi.is_some()
    }

    pub fn total_size(&self) -> i64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Everything needed to insert a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct NewDataset {
    pub user_id: i64,
    pub kind: DatasetKind,
    pub metadata: DatasetMetadata,
    pub files: Vec<NewDatasetFile>,
    pub version: i32,
    pub previous_version_id: Option<i64>,
}
