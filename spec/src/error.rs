//! Errors raised while loading specification documents and resources.

use std::path::PathBuf;

use thiserror::Error;

/// A specification document or resource could not be loaded.
#[derive(Debug, Error)]
pub enum SpecError {
    /// The file could not be read.
    #[error("cannot read {path:?}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The input is not valid JSON, or does not match the expected shape.
    #[error("invalid specification JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The top-level document is not a JSON object.
    #[error("specification document is not a tree (expected a JSON object)")]
    NotATree,
    /// The document has no `specifications` map.
    #[error("specification document has no \"specifications\" map")]
    MissingSpecifications,
    /// The resource loader has no resource with this id.
    #[error("unknown resource: {0}")]
    UnknownResource(String),
}
