//! Deposition API wire types
//!
//! These mirror the records exchanged with the deposition service: the
//! fakenodo server serializes them and the PixelHub archival client
//! deserializes them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a deposition. `Published` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepositionState {
    #[default]
    Draft,
    Published,
}

impl std::fmt::Display for DepositionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositionState::Draft => write!(f, "draft"),
            DepositionState::Published => write!(f, "published"),
        }
    }
}

/// An archival record representing a publishable snapshot of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposition {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub state: DepositionState,
    pub doi: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Deposition {
    pub fn is_published(&self) -> bool {
        self.state == DepositionState::Published
    }
}

/// A file attached to a deposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositionFile {
    pub id: u64,
    pub deposition_id: u64,
    #[serde(alias = "filename")]
    pub name: String,
    #[serde(alias = "filesize", default)]
    pub size: u64,
    #[serde(default)]
    pub checksum: String,
}

/// Input of a deposition creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDeposition {
    pub title: String,
    pub description: String,
    pub metadata: Map<String, Value>,
}

impl NewDeposition {
    /// Interpret a creation payload.
    ///
    /// Two shapes are accepted:
    /// - flat: `{"title": .., "description": .., "metadata": {..}}`
    /// - Zenodo-style: `{"metadata": {"title": .., "description": .., ..}}`
    ///
    /// The nested shape wins when `metadata` is an object and the flat
    /// `title`/`description` pair is incomplete.
    pub fn from_payload(payload: &Value) -> Self {
        let text = |value: Option<&Value>| {
            value
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };

        let nested = payload.get("metadata").and_then(Value::as_object);
        let flat_complete = payload.get("title").is_some() && payload.get("description").is_some();

        match nested {
            Some(meta) if !flat_complete => Self {
                title: text(meta.get("title")),
                description: text(meta.get("description")),
                metadata: meta.clone(),
            },
            _ => Self {
                title: text(payload.get("title")),
                description: text(payload.get("description")),
                metadata: nested.cloned().unwrap_or_default(),
            },
        }
    }
}

/// Body of a publish request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}
