//! Error types for catalog document loading.
//!
//! Covers file I/O, both serialization formats, unknown file extensions and
//! option definitions the catalog refuses.

use optcat_core::CatalogError;
use thiserror::Error;

/// Errors that can occur while reading, writing or converting documents.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension is neither `.yaml`/`.yml` nor `.json`.
    #[error("unsupported document format: '{0}' (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),

    /// An option or group in the document is invalid.
    #[error("invalid option definition: {0}")]
    Catalog(#[from] CatalogError),
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
