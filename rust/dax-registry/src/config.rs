use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Address, RegistryState};

/// The values a registry is constructed with.
///
/// ```json
/// {
///   "owner": "0x00000000000000000000000000000000000000aa",
///   "metadata_uri": "ipfs://meta",
///   "download_uri": "https://data.example/files"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The owner.
    pub owner: Address,

    /// Initial metadata URI.
    #[serde(default)]
    pub metadata_uri: String,

    /// Initial download URI.
    #[serde(default)]
    pub download_uri: String,
}

/// Errors that can occur while loading a [`RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config '{}': {source}", path.display())]
    Read {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The contents are not a valid configuration.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RegistryConfig {
    /// Parses a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Builds the initial state: the configured owner and URIs, no grants.
    pub fn into_state(self) -> RegistryState {
        RegistryState::new(self.owner, self.metadata_uri, self.download_uri)
    }
}
