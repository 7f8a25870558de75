//! Downloadable components

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::build::BuildSummary;
use crate::downloader::sources::{AssetPattern, DownloadSource, GithubSource, HttpSource};
use crate::downloader::{DownloadRequest, Downloader};
use crate::install::{InstallContext, InstallOutcome, install_file};
use crate::manifest::{ComponentSpec, ManifestError};
use crate::report::Console;

/// A component of a segment, with its paths resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub description: String,
    pub source: DownloadSource,
    pub disabled: bool,
    pub download_dir: PathBuf,
    pub install_dir: PathBuf,
    downloaded: Vec<String>,
}

impl Component {
    /// Build a component from its manifest entry
    ///
    /// A `github` block takes precedence over `url`; an empty `url` counts
    /// as no source.
    ///
    /// Asset patterns are the GitHub `regex` list followed by the
    /// component-level `regex` list. Both lists are matched against release
    /// assets, so a component-level pattern widens what gets downloaded.
    pub fn from_spec(spec: &ComponentSpec, download_dir: &Path, install_dir: &Path) -> Result<Self, ManifestError> {
        let source = if let Some(github) = &spec.github {
            let mut source = GithubSource::new(&github.repo).with_query(&github.query);
            for pattern in github.regex.iter().chain(&spec.regex) {
                let compiled = AssetPattern::new(pattern).map_err(|source| ManifestError::InvalidPattern {
                    component: spec.name.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
                source = source.with_pattern(compiled);
            }
            DownloadSource::Github(source)
        } else if let Some(url) = spec.url.as_deref().filter(|u| !u.is_empty()) {
            DownloadSource::Url(HttpSource::new(url))
        } else {
            DownloadSource::None
        };

        Ok(Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            source,
            disabled: spec.is_disabled,
            download_dir: download_dir.to_path_buf(),
            install_dir: install_dir.to_path_buf(),
            downloaded: Vec::new(),
        })
    }

    /// Filenames fetched by the last download, in order
    pub fn downloaded(&self) -> &[String] {
        &self.downloaded
    }

    /// Fetch every file the source resolves to
    ///
    /// Failures are reported and counted; a failed file is simply not
    /// recorded. A disabled component makes no request at all.
    pub async fn download(&mut self, downloader: &Downloader, console: &Console, summary: &mut BuildSummary) {
        self.downloaded.clear();

        if self.disabled {
            console.warn(1, &format!("- {} is disabled, skipped", self.name));
            debug!("Component {} disabled", self.name);
            return;
        }

        console.action(1, "- Download ", &format!("{} ({})", self.name, self.source.description()));

        if let DownloadSource::Github(github) = &self.source {
            if github.repo.is_empty() {
                let message = format!("{}: no GitHub repository configured", self.name);
                console.warn(2, &message);
                summary.errors.push(message);
                return;
            }
        }

        let files = match self.source.resolve(downloader).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Failed to resolve {}: {}", self.name, e);
                let message = format!("{}: {}", self.name, e);
                console.warn(2, &message);
                summary.errors.push(message);
                return;
            }
        };

        if files.is_empty() && matches!(self.source, DownloadSource::Github(_)) {
            console.warn(2, "No matching release assets");
        }

        for file in files {
            let request = DownloadRequest::new(&file.url, &self.download_dir);
            let filename = request.get_filename();
            console.step(2, "Download ", file.asset_name.as_deref().unwrap_or(&filename));

            match downloader.download(&request).await {
                Ok(result) => {
                    info!("Downloaded {} ({} bytes)", result.filename, result.size);
                    summary.downloaded += 1;
                    self.downloaded.push(result.filename);
                }
                Err(e) => {
                    warn!("Download of {} failed ({}): {}", file.url, e.category(), e);
                    console.error(3, &format!("Download failed: {}", e));
                    summary.record_failure(format!("{}: {}", self.name, e));
                }
            }
        }
    }

    /// Install every downloaded file
    ///
    /// Archives are unpacked into `archive_dir` (the segment's install
    /// directory); single files are copied into the component's own.
    pub async fn install(&self, archive_dir: &Path, console: &Console, summary: &mut BuildSummary) {
        if self.disabled || self.downloaded.is_empty() {
            return;
        }

        let ctx = InstallContext {
            download_dir: self.download_dir.clone(),
            install_dir: self.install_dir.clone(),
            archive_dir: archive_dir.to_path_buf(),
        };

        console.action(1, "- Install ", &self.name);
        for filename in &self.downloaded {
            match install_file(filename, &ctx).await {
                Ok(InstallOutcome::Extracted { destination, entries }) => {
                    console.step(2, "Extract ", &format!("{} to {}", filename, destination.display()));
                    debug!("Extracted {} entries from {}", entries, filename);
                    summary.installed += 1;
                }
                Ok(InstallOutcome::Copied { destination, verified }) => {
                    console.step(2, "Copy ", &format!("{} to {}", filename, destination.display()));
                    if verified {
                        console.success(3, "Done");
                    } else {
                        console.warn(3, &format!("{} missing after copy", destination.display()));
                    }
                    summary.installed += 1;
                }
                Ok(InstallOutcome::Skipped { filename }) => {
                    console.warn(2, &format!("Unknown file type: {}, skipped", filename));
                    summary.skipped += 1;
                }
                Err(e) => {
                    warn!("Install of {} failed: {}", filename, e);
                    console.error(2, &format!("Install of {} failed: {}", filename, e));
                    summary.record_failure(format!("{}: {}", self.name, e));
                }
            }
        }
    }
}
