//! GitHub release download source
//!
//! Queries the releases API for a repository and picks the assets whose names
//! match the configured patterns.

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::downloader::Downloader;
use crate::downloader::core::Result;
use crate::downloader::sources::ResolvedFile;

/// Query used when the manifest does not name one
pub const DEFAULT_QUERY: &str = "releases/latest";

/// A compiled asset-name pattern
///
/// A pattern matches when it matches at the very start of the asset name; the
/// rest of the name is not required to match.
#[derive(Debug, Clone)]
pub struct AssetPattern(Regex);

impl AssetPattern {
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    pub fn matches(&self, name: &str) -> bool {
        // Leftmost-first search: if any match starts at 0, the first one does.
        self.0.find(name).is_some_and(|m| m.start() == 0)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for AssetPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

/// One entry of a release's `assets` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Download assets from a GitHub release
#[derive(Debug, Clone, PartialEq)]
pub struct GithubSource {
    /// `owner/name` slug
    pub repo: String,
    /// API path below the repository, e.g. `releases/latest` or `releases/tags/v1.0`
    pub query: String,
    /// Patterns tried against every asset name, in order
    pub patterns: Vec<AssetPattern>,
}

impl GithubSource {
    pub fn new<S: Into<String>>(repo: S) -> Self {
        Self {
            repo: repo.into(),
            query: DEFAULT_QUERY.to_string(),
            patterns: Vec::new(),
        }
    }

    pub fn with_query<S: Into<String>>(mut self, query: S) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_pattern(mut self, pattern: AssetPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Release API URL for this source
    pub fn api_url(&self, api_base: &str) -> String {
        format!("{}/repos/{}/{}", api_base.trim_end_matches('/'), self.repo, self.query)
    }

    /// Look up the release and return every matching asset download
    ///
    /// An error means the lookup itself failed; a response without an
    /// `assets` array resolves to nothing.
    pub async fn resolve(&self, downloader: &Downloader) -> Result<Vec<ResolvedFile>> {
        let url = self.api_url(&downloader.config().github_api_base);
        let release = downloader.get_json(&url).await?;

        let assets = release_assets(&release);
        if assets.is_empty() {
            debug!("No assets listed for {} ({})", self.repo, url);
        }

        Ok(self.select(&assets))
    }

    /// Schedule one download per (asset, matching pattern) pair
    ///
    /// An asset matched by several patterns is scheduled once per pattern.
    pub fn select(&self, assets: &[ReleaseAsset]) -> Vec<ResolvedFile> {
        let mut scheduled = Vec::new();
        for asset in assets {
            for pattern in &self.patterns {
                if pattern.matches(&asset.name) {
                    debug!("Asset {} matches /{}/", asset.name, pattern.as_str());
                    scheduled.push(ResolvedFile {
                        url: percent_decode_str(&asset.browser_download_url)
                            .decode_utf8_lossy()
                            .into_owned(),
                        asset_name: Some(asset.name.clone()),
                    });
                }
            }
        }
        scheduled
    }
}

/// Extract the `assets` array from a release document, skipping malformed entries
pub fn release_assets(release: &Value) -> Vec<ReleaseAsset> {
    let Some(entries) = release.get("assets").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match ReleaseAsset::deserialize(entry) {
            Ok(asset) => Some(asset),
            Err(e) => {
                warn!("Skipping malformed release asset: {}", e);
                None
            }
        })
        .collect()
}
