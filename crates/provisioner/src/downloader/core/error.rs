//! Error types for the downloader system with context for reporting

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving or fetching a single file
///
/// None of these abort a build: the component reports them and carries on
/// with whatever else it has to do.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// Transport-level failure (connection refused, TLS, broken stream...)
    #[error("HTTP request to '{url}' failed")]
    HttpRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code
    #[error("Download failed for '{url}': status code {status}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// File system I/O errors with file context
    #[error("File operation failed on '{path}' while {operation}")]
    FileSystem {
        path: PathBuf,
        operation: FileOperation,
        #[source]
        source: std::io::Error,
    },

    /// The response body was not the JSON document we expected
    #[error("Unexpected response from '{url}': {reason}")]
    InvalidResponse { url: String, reason: String },
}

/// Types of file operations for error context
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileOperation {
    Create,
    Write,
    Sync,
    Move,
    CreateDir,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Create => write!(f, "creating"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::Sync => write!(f, "syncing"),
            FileOperation::Move => write!(f, "moving"),
            FileOperation::CreateDir => write!(f, "creating directory"),
        }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl DownloadError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        DownloadError::HttpRequest {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, operation: FileOperation, source: std::io::Error) -> Self {
        DownloadError::FileSystem {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            DownloadError::HttpRequest { .. } => "http_request",
            DownloadError::HttpStatus { .. } => "http_status",
            DownloadError::FileSystem { .. } => "file_system",
            DownloadError::InvalidResponse { .. } => "invalid_response",
        }
    }

    /// Status code returned by the server, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            DownloadError::HttpStatus { status, .. } => Some(*status),
            DownloadError::HttpRequest { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
