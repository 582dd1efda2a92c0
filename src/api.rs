//! Ledger API wire types
//!
//! Representations of the records the service returns. State fields the
//! confirmation predicates inspect (`confirmation_status`, the SBOM date
//! fields) default to their "not yet" value when the service omits them, so
//! a partially committed record reads as still-in-progress rather than as a
//! parse error.

use serde::{Deserialize, Serialize};

/// Commitment state of an asset or subject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfirmationStatus {
    /// The service has not reported a status yet.
    #[default]
    Unspecified,
    /// Accepted but not durably committed.
    Pending,
    /// Durably committed and visible to third parties.
    Confirmed,
    /// The service gave up committing the record.
    Failed,
}

/// An asset record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Resource name, e.g. `assets/6a95…`.
    pub identity: String,

    /// Caller-defined attributes. Opaque to this client.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub confirmation_status: ConfirmationStatus,
}

/// Request body for creating an asset
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetCreate {
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl AssetCreate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// List envelope for assets
#[derive(Debug, Clone, Deserialize)]
pub struct AssetList {
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A subject record (an external party granted read access)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Resource name, e.g. `subjects/9f0c…`.
    pub identity: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub confirmation_status: ConfirmationStatus,
}

/// Request body for creating a subject
#[derive(Debug, Clone, Serialize)]
pub struct SubjectCreate {
    pub display_name: String,
}

impl SubjectCreate {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

/// List envelope for subjects
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectList {
    #[serde(default)]
    pub subjects: Vec<Subject>,
}

/// Metadata record for an uploaded SBOM
///
/// The record itself only exists once the ingest pipeline has processed the
/// upload; reading it earlier yields HTTP 404. The date fields are empty
/// strings until the corresponding transition has happened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SbomMetadata {
    /// Resource name, e.g. `sboms/41dc…`.
    pub identity: String,

    #[serde(default)]
    pub component: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub uploaded_date: String,

    #[serde(default)]
    pub published_date: String,

    #[serde(default)]
    pub withdrawn_date: String,
}

impl SbomMetadata {
    /// True once the record carries a publication date.
    pub fn is_published(&self) -> bool {
        !self.published_date.is_empty()
    }

    /// True once the record carries a withdrawal date.
    pub fn is_withdrawn(&self) -> bool {
        !self.withdrawn_date.is_empty()
    }
}

/// List envelope for SBOM metadata
#[derive(Debug, Clone, Deserialize)]
pub struct SbomList {
    #[serde(default)]
    pub sboms: Vec<SbomMetadata>,
}
