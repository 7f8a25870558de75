//! Configuration types for the downloader system

use std::time::Duration;

/// Base URL of the public GitHub REST API
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Configuration for download operations
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Sent with every request; the GitHub API rejects anonymous agents
    pub user_agent: String,
    /// Base URL used to build release queries (`{base}/repos/{repo}/{query}`)
    pub github_api_base: String,
    /// Size of the buffer flushed and synced to disk per write
    pub chunk_size: usize,
    /// Per-request timeout. `None` keeps the HTTP client's default (no timeout)
    pub timeout: Option<Duration>,
}

impl DownloadConfig {
    pub fn with_github_api_base<S: Into<String>>(mut self, base: S) -> Self {
        self.github_api_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("sdsetup/", env!("CARGO_PKG_VERSION")).to_string(),
            github_api_base: GITHUB_API_BASE.to_string(),
            chunk_size: 2 * 1024 * 1024, // 2 MiB
            timeout: None,
        }
    }
}
