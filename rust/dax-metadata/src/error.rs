use thiserror::Error;

/// Errors that can occur while reading or writing a metadata document.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The input is not a valid metadata document.
    #[error("Failed to decode metadata document: {0}")]
    Decode(#[source] serde_json::Error),

    /// The document could not be rendered.
    #[error("Failed to encode metadata document: {0}")]
    Encode(#[source] serde_json::Error),
}
