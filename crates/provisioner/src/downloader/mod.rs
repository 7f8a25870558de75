//! File downloader for manifest components
//!
//! The call chain flows as follows:
//!
//! Component (build/component.rs)
//! ↓
//! DownloadSource (sources/mod.rs)
//! ↓
//! GithubSource / HttpSource (sources/*)
//! ↓
//! Downloader (this file)
//! ↓
//! Core types (core/*)
//!
//! Every request is awaited to completion before the next one starts; there
//! is no batching, retry or resume.

pub mod config;
pub mod core;
pub mod sources;

// Re-export main types for convenience
pub use config::DownloadConfig;
pub use self::core::{
    ConsoleProgressReporter, DownloadError, DownloadRequest, DownloadResult, FileOperation,
    IntoProgressCallback, ProgressCallback, ProgressEvent, ProgressReporter, Result,
};
pub use sources::{DownloadSource, GithubSource, HttpSource};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Longest response body kept in an `HttpStatus` error
const MAX_ERROR_BODY: usize = 512;

/// Streaming HTTP downloader shared by every component of a build
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
    progress_callback: Option<ProgressCallback>,
}

impl Downloader {
    /// Create a downloader with its own HTTP client
    ///
    /// A zero `chunk_size` is raised to one byte.
    pub fn new(mut config: DownloadConfig) -> Result<Self> {
        config.chunk_size = config.chunk_size.max(1);
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| DownloadError::request("<client>", e))?;

        Ok(Self {
            client,
            config,
            progress_callback: None,
        })
    }

    /// Set a progress callback for download updates
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }

    /// GET a URL and parse the body as JSON
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::request(url, e))?;

        let response = check_status(url, response).await?;
        let body = response.text().await.map_err(|e| DownloadError::request(url, e))?;

        serde_json::from_str(&body).map_err(|e| DownloadError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// Stream a file to `request.destination`
    ///
    /// The body is written to a `.part` file in fixed-size chunks, each one
    /// flushed and synced before the next is written, then renamed into place.
    pub async fn download(&self, request: &DownloadRequest) -> Result<DownloadResult> {
        let filename = request.get_filename();
        let dest_path = request.destination.join(&filename);
        let temp_path = part_path(&dest_path);

        debug!("Download: {} to {}", request.url, dest_path.display());

        fs::create_dir_all(&request.destination)
            .await
            .map_err(|e| DownloadError::fs(&request.destination, FileOperation::CreateDir, e))?;

        let size = match self.stream_to_file(&request.url, &temp_path).await {
            Ok(size) => size,
            Err(e) => {
                self.emit(ProgressEvent::Error {
                    url: request.url.clone(),
                    error: e.to_string(),
                });
                if let Err(cleanup) = fs::remove_file(&temp_path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to remove partial file {}: {}", temp_path.display(), cleanup);
                    }
                }
                return Err(e);
            }
        };

        fs::rename(&temp_path, &dest_path)
            .await
            .map_err(|e| DownloadError::fs(&dest_path, FileOperation::Move, e))?;

        debug!("Download completed: {} bytes", size);
        Ok(DownloadResult { filename, size })
    }

    async fn stream_to_file(&self, url: &str, temp_path: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::request(url, e))?;
        let response = check_status(url, response).await?;

        let total_size = response.content_length();
        self.emit(ProgressEvent::DownloadStarted {
            url: url.to_string(),
            total_size,
        });

        let mut file = fs::File::create(temp_path)
            .await
            .map_err(|e| DownloadError::fs(temp_path, FileOperation::Create, e))?;

        let chunk_size = self.config.chunk_size;
        let mut buffer: Vec<u8> = Vec::with_capacity(chunk_size);
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(|e| DownloadError::request(url, e))?;
            downloaded += chunk.len() as u64;
            buffer.extend_from_slice(&chunk);

            while buffer.len() >= chunk_size {
                let rest = buffer.split_off(chunk_size);
                write_chunk(&mut file, &buffer, temp_path).await?;
                buffer = rest;
            }

            self.emit(ProgressEvent::DownloadProgress {
                url: url.to_string(),
                downloaded,
                total: total_size,
            });
        }

        if !buffer.is_empty() {
            write_chunk(&mut file, &buffer, temp_path).await?;
        }

        self.emit(ProgressEvent::DownloadComplete {
            url: url.to_string(),
            final_size: downloaded,
        });

        Ok(downloaded)
    }
}

/// Write one chunk and push it all the way to disk
async fn write_chunk(file: &mut fs::File, chunk: &[u8], path: &Path) -> Result<()> {
    file.write_all(chunk)
        .await
        .map_err(|e| DownloadError::fs(path, FileOperation::Write, e))?;
    file.flush()
        .await
        .map_err(|e| DownloadError::fs(path, FileOperation::Write, e))?;
    file.sync_all()
        .await
        .map_err(|e| DownloadError::fs(path, FileOperation::Sync, e))?;
    Ok(())
}

async fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }

    Err(DownloadError::HttpStatus {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

fn part_path(dest_path: &Path) -> PathBuf {
    let mut name = OsString::from(dest_path.as_os_str());
    name.push(".part");
    PathBuf::from(name)
}
