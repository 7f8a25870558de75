//! Manifest loading errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a build before it starts
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Manifest top level must be a JSON object")]
    NotAnObject,

    #[error("Invalid entry '{name}' in manifest: {source}")]
    InvalidSegment {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid asset pattern '{pattern}' in component '{component}': {source}")]
    InvalidPattern {
        component: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
