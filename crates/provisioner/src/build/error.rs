//! Build error types

use std::path::PathBuf;
use thiserror::Error;

use crate::downloader::DownloadError;
use crate::manifest::ManifestError;
use crate::plugins::PluginError;

/// Errors that abort a build
///
/// Download, install and ini failures are reported and counted in the
/// [`BuildSummary`](crate::build::BuildSummary) instead of surfacing here.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Failed to set up downloader: {0}")]
    Downloader(#[from] DownloadError),

    #[error("External step {function}() failed: {source}")]
    External {
        function: String,
        #[source]
        source: PluginError,
    },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}
