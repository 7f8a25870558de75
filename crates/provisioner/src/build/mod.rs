//! Build orchestration
//!
//! A [`Provisioner`] owns the resolved manifest (root configuration plus
//! segments in declaration order) and runs it:
//!
//! 1. wipe the root install directory
//! 2. re-create every segment's directories
//! 3. build each segment: components, ini files, external steps
//!
//! Everything runs one step at a time. Only manifest problems and external
//! step failures stop a build; the rest is collected in a [`BuildSummary`].

pub mod component;
pub mod error;
pub mod external;
pub mod ini;
pub mod root;
pub mod segment;

pub use component::Component;
pub use error::BuildError;
pub use external::ExternalStep;
pub use ini::IniFile;
pub use root::RootConfig;
pub use segment::Segment;

use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, info, warn};

use crate::downloader::{DownloadConfig, Downloader, ProgressCallback};
use crate::manifest::{Manifest, load_manifest, manifest_path};
use crate::plugins::PluginRegistry;
use crate::report::Console;

/// Options for a build
#[derive(Clone)]
pub struct BuildOptions {
    /// Directory holding `cfg/sd/...` and external scripts (default: `.`)
    pub base_dir: PathBuf,
    pub download: DownloadConfig,
    /// Suppress console output
    pub quiet: bool,
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            download: DownloadConfig::default(),
            quiet: false,
            progress_callback: None,
        }
    }
}

impl BuildOptions {
    pub fn with_base_dir<P: Into<PathBuf>>(mut self, base_dir: P) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_download_config(mut self, config: DownloadConfig) -> Self {
        self.download = config;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Result of a build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    /// Files downloaded successfully
    pub downloaded: usize,
    /// Files that failed to download or install
    pub failed: usize,
    /// Files extracted or copied into the install tree
    pub installed: usize,
    /// Files of unknown type left alone
    pub skipped: usize,
    pub ini_written: usize,
    pub plugins_run: usize,
    /// Every reported problem, in order
    pub errors: Vec<String>,
}

impl BuildSummary {
    pub(crate) fn record_failure(&mut self, message: String) {
        self.failed += 1;
        self.errors.push(message);
    }

    /// True when nothing was reported
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Shared state handed to every segment
pub struct BuildContext<'a> {
    pub downloader: &'a Downloader,
    pub registry: &'a PluginRegistry,
    pub console: &'a Console,
    pub root: &'a RootConfig,
}

/// Runs a manifest against the filesystem
pub struct Provisioner {
    root: RootConfig,
    segments: Vec<Segment>,
    downloader: Downloader,
    registry: PluginRegistry,
    console: Console,
}

impl Provisioner {
    /// Resolve a parsed manifest
    ///
    /// Nothing touches the filesystem here; see [`Provisioner::prepare_dirs`].
    pub fn from_manifest(manifest: &Manifest, options: &BuildOptions) -> Result<Self, BuildError> {
        let root = RootConfig::from(&manifest.root);
        let segments = manifest
            .segments
            .iter()
            .map(|(name, spec)| Segment::from_spec(name, spec, &root, &options.base_dir))
            .collect::<Result<Vec<_>, _>>()?;

        let mut downloader = Downloader::new(options.download.clone())?;
        if let Some(callback) = &options.progress_callback {
            downloader = downloader.with_progress_callback(callback.clone());
        }

        let console = if options.quiet {
            Console::quiet()
        } else {
            Console::new(root.indent)
        };

        Ok(Self {
            root,
            segments,
            downloader,
            registry: PluginRegistry::new(),
            console,
        })
    }

    /// Load `cfg/sd/<id1>/<id2>.json` below the base directory and prepare it
    pub async fn load(options: &BuildOptions, id1: &str, id2: &str) -> Result<Self, BuildError> {
        let path = manifest_path(&options.base_dir, id1, id2);
        info!("Loading manifest {}", path.display());

        let manifest = load_manifest(&path)?;
        let provisioner = Self::from_manifest(&manifest, options)?;
        provisioner.prepare_dirs().await;
        Ok(provisioner)
    }

    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn root(&self) -> &RootConfig {
        &self.root
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Create every segment's directories; failures are only logged
    pub async fn prepare_dirs(&self) {
        for segment in &self.segments {
            if let Err(e) = segment.prepare_dirs().await {
                warn!("Segment {}: {}", segment.name, e);
                self.console.warn(0, &e.to_string());
            }
        }
    }

    /// Wipe the install root and run every segment in order
    pub async fn build(&mut self) -> Result<BuildSummary, BuildError> {
        if !self.root.description.is_empty() {
            self.console.banner(&self.root.description);
        }
        for (label, dir) in self.root.locations() {
            self.console.step(0, label, &dir);
        }

        self.clean_install_dir().await;
        self.prepare_dirs().await;

        let mut summary = BuildSummary::default();
        let ctx = BuildContext {
            downloader: &self.downloader,
            registry: &self.registry,
            console: &self.console,
            root: &self.root,
        };

        for (index, segment) in self.segments.iter_mut().enumerate() {
            segment.build(index + 1, &ctx, &mut summary).await?;
        }

        info!(
            "Build finished: {} downloaded, {} installed, {} skipped, {} failed",
            summary.downloaded, summary.installed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    async fn clean_install_dir(&self) {
        let dir = &self.root.install_dir;
        if dir.as_os_str().is_empty() {
            debug!("No install directory configured, nothing to remove");
            return;
        }

        self.console.step(0, "Remove ", &dir.display().to_string());
        match fs::remove_dir_all(dir).await {
            Ok(()) => debug!("Removed {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", dir.display());
            }
            Err(e) => {
                warn!("Failed to remove {}: {}", dir.display(), e);
                self.console.warn(1, &format!("Failed to remove {}: {}", dir.display(), e));
            }
        }
    }
}
