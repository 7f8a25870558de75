//! Provisioner Library
//!
//! Builds an SD-card layout from a JSON manifest. The manifest lists
//! components (GitHub release assets or direct URLs) grouped into segments;
//! each component is downloaded into a cache and installed by file type,
//! then ini files are written and external plugins run.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use provisioner::{BuildOptions, PluginRegistry, Provisioner};
//!
//! # async fn example() -> Result<(), provisioner::BuildError> {
//! let options = BuildOptions::default().with_base_dir("/path/to/project");
//!
//! // Reads /path/to/project/cfg/sd/emummc/stock.json
//! let mut provisioner = Provisioner::load(&options, "emummc", "stock")
//!     .await?
//!     .with_registry(PluginRegistry::new());
//!
//! let summary = provisioner.build().await?;
//! println!("{} file(s) installed", summary.installed);
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod downloader;
pub mod install;
pub mod manifest;
pub mod plugins;
pub mod report;

pub use build::{BuildError, BuildOptions, BuildSummary, Provisioner};
pub use downloader::{
    ConsoleProgressReporter, DownloadConfig, DownloadError, Downloader, IntoProgressCallback,
    ProgressCallback, ProgressEvent,
};
pub use install::{InstallError, InstallOutcome};
pub use manifest::{Manifest, ManifestError, load_manifest, manifest_path};
pub use plugins::{ExternalPlugin, PluginContext, PluginError, PluginRegistry};
pub use report::Console;
