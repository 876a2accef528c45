use std::fmt;

use dax_registry::{Address, RegistryState};

use crate::AssetMetadata;

/// A way in which a metadata document disagrees with its registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataConflict {
    /// The document names a different owner.
    Owner {
        /// Owner named by the document.
        document: Address,
        /// Owner of the registry.
        registry: Address,
    },

    /// The document points at a different download location.
    DownloadUri {
        /// Download URI named by the document.
        document: String,
        /// Download URI stored in the registry.
        registry: String,
    },
}

impl fmt::Display for MetadataConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner { document, registry } => {
                write!(f, "owner is {document} in the document but {registry} in the registry")
            }
            Self::DownloadUri { document, registry } => write!(
                f,
                "download URI is '{document}' in the document but '{registry}' in the registry"
            ),
        }
    }
}

impl AssetMetadata {
    /// Lists where this document disagrees with a registry's owner and
    /// download URI. An empty list means they agree.
    ///
    /// URIs are compared after parsing, so differences the URL standard
    /// considers insignificant (such as host case) are not reported. A
    /// registry URI that does not parse is compared as text.
    pub fn conflicts_with(&self, owner: Address, download_uri: &str) -> Vec<MetadataConflict> {
        let mut conflicts = Vec::new();

        if self.owner != owner {
            conflicts.push(MetadataConflict::Owner {
                document: self.owner,
                registry: owner,
            });
        }

        let same_download = match url::Url::parse(download_uri) {
            Ok(registry) => registry == self.download_uri,
            Err(_) => self.download_uri.as_str() == download_uri,
        };
        if !same_download {
            conflicts.push(MetadataConflict::DownloadUri {
                document: self.download_uri.to_string(),
                registry: download_uri.to_owned(),
            });
        }

        conflicts
    }

    /// [`AssetMetadata::conflicts_with`] against a registry's state.
    pub fn conflicts_with_registry(&self, state: &RegistryState) -> Vec<MetadataConflict> {
        self.conflicts_with(state.data_owner(), state.download_uri())
    }
}
