//! Download source implementations
//!
//! Each source type is defined in its own file along with its resolution logic.

pub mod github;
pub mod http;

pub use github::{AssetPattern, GithubSource, ReleaseAsset};
pub use http::HttpSource;

use crate::downloader::Downloader;
use crate::downloader::core::Result;

/// A concrete file a source resolved to
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFile {
    /// URL to fetch
    pub url: String,
    /// Release asset name, for GitHub sources
    pub asset_name: Option<String>,
}

/// Where a component's files come from
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DownloadSource {
    /// Assets of a GitHub release
    Github(GithubSource),
    /// A single direct URL
    Url(HttpSource),
    /// Nothing to download
    #[default]
    None,
}

impl DownloadSource {
    /// Get a human-readable description of this download source
    pub fn description(&self) -> String {
        match self {
            DownloadSource::Github(github) => format!("Repo: github/{}", github.repo),
            DownloadSource::Url(http) => format!("URL: {}", http.url),
            DownloadSource::None => "No download source".to_string(),
        }
    }

    /// Resolve the source to the list of files to fetch, in order
    pub async fn resolve(&self, downloader: &Downloader) -> Result<Vec<ResolvedFile>> {
        match self {
            DownloadSource::Github(github) => github.resolve(downloader).await,
            DownloadSource::Url(http) => Ok(http.resolve()),
            DownloadSource::None => Ok(Vec::new()),
        }
    }
}
