#![warn(missing_docs)]

//! The metadata document a registry's metadata URI points at.
//!
//! The registry stores only the URI and never looks inside the document.
//! This crate is for the off-ledger side: publishing a document, reading
//! one back, and checking that it agrees with the registry it belongs to.
//!
//! ```json
//! {
//!   "name": "Coastal survey 2024",
//!   "description": "Raw sonar captures",
//!   "created_at": "2024-03-01T12:00:00Z",
//!   "owner": "0x00000000000000000000000000000000000000aa",
//!   "license": "CC-BY-4.0",
//!   "download_uri": "https://data.example/survey",
//!   "document_uri": "https://data.example/survey/README.md",
//!   "files": [{ "filename": "capture-01.bin", "hash": "bafy..." }]
//! }
//! ```

mod document;
pub use document::*;

mod error;
pub use error::*;

mod conflict;
pub use conflict::*;
