use chrono::{DateTime, Utc};
use dax_registry::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::MetadataError;

/// A description of a data asset and the files it is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Human readable name of the asset.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// When the asset was created, as an ISO-8601 timestamp.
    pub created_at: DateTime<Utc>,

    /// The identity that owns the asset.
    pub owner: Address,

    /// License the asset is offered under.
    pub license: String,

    /// Where authorized subjects fetch the files.
    pub download_uri: Url,

    /// Where the asset's documentation lives.
    pub document_uri: Url,

    /// The files that make up the asset.
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// One file of an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Name of the file as served by the download endpoint.
    pub filename: String,

    /// Content hash of the file. The algorithm is chosen by the publisher.
    pub hash: String,
}

impl AssetMetadata {
    /// Parses a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        serde_json::from_str(json).map_err(MetadataError::Decode)
    }

    /// Parses a document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MetadataError> {
        serde_json::from_slice(bytes).map_err(MetadataError::Decode)
    }

    /// Renders the document as indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, MetadataError> {
        serde_json::to_string_pretty(self).map_err(MetadataError::Encode)
    }

    /// Looks up a file entry by its filename.
    pub fn file(&self, filename: &str) -> Option<&FileEntry> {
        self.files.iter().find(|file| file.filename == filename)
    }
}
