//! Core types used throughout the downloader system
//!
//! This module contains the fundamental types that all other modules depend on.
//! By organizing these in a core module, we make the dependency relationships clear.

pub mod error;
pub mod progress;

// Re-export main types for convenience
pub use error::{DownloadError, FileOperation, Result};
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, ProgressCallback, ProgressEvent,
    ProgressReporter,
};

use std::path::PathBuf;

/// Name used when a URL has no usable last path segment
pub const FALLBACK_FILENAME: &str = "downloaded_file";

/// A single file to fetch into a directory
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// Fully resolved URL of the file
    pub url: String,
    /// Directory where the file should be saved
    pub destination: PathBuf,
}

impl DownloadRequest {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(url: S, destination: P) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
        }
    }

    /// Filename the download will be stored under
    pub fn get_filename(&self) -> String {
        filename_from_url(&self.url)
    }
}

/// Derive the on-disk filename from a URL
///
/// Takes the last `/`-separated segment (query and fragment dropped) and
/// replaces spaces with underscores.
pub fn filename_from_url(url: &str) -> String {
    let without_query = url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    let last_segment = without_query.rsplit('/').next().unwrap_or_default();
    if last_segment.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    last_segment.replace(' ', "_")
}

/// Result of a successful download
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    /// Filename inside the request's destination directory
    pub filename: String,
    /// Number of bytes written
    pub size: u64,
}
