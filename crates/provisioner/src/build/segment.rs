//! Segments: named groups of install steps

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::build::component::Component;
use crate::build::error::BuildError;
use crate::build::external::ExternalStep;
use crate::build::ini::IniFile;
use crate::build::root::RootConfig;
use crate::build::{BuildContext, BuildSummary};
use crate::manifest::{ManifestError, SegmentSpec};

const DEFAULT_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub name: String,
    pub description: String,
    /// `root.download_dir/dl`
    pub download_dir: PathBuf,
    /// `root.install_dir/sd`
    pub install_dir: PathBuf,
    pub components: Vec<Component>,
    pub ini_files: Vec<IniFile>,
    pub externals: Vec<ExternalStep>,
}

impl Segment {
    /// Resolve a segment entry against the root configuration
    ///
    /// `base_dir` is where external script paths are resolved from.
    pub fn from_spec(name: &str, spec: &SegmentSpec, root: &RootConfig, base_dir: &Path) -> Result<Self, ManifestError> {
        let download_dir = join_optional(&root.download_dir, spec.dl.as_deref());
        let install_dir = join_optional(&root.install_dir, spec.sd.as_deref());

        let components = spec
            .component
            .iter()
            .map(|c| Component::from_spec(c, &download_dir, &install_dir))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.to_string(),
            description: spec
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            components,
            ini_files: spec
                .ini
                .iter()
                .map(|ini| IniFile::from_spec(ini, &root.install_dir))
                .collect(),
            externals: spec
                .external
                .iter()
                .map(|external| ExternalStep::from_spec(external, base_dir))
                .collect(),
            download_dir,
            install_dir,
        })
    }

    /// Create the download and install directories if missing
    pub async fn prepare_dirs(&self) -> Result<(), BuildError> {
        for dir in [&self.download_dir, &self.install_dir] {
            if dir.as_os_str().is_empty() {
                continue;
            }
            fs::create_dir_all(dir).await.map_err(|e| BuildError::io(dir, e))?;
        }
        Ok(())
    }

    /// Run components, then ini files, then external steps
    ///
    /// Only an external step failure is returned; everything else ends up in
    /// `summary`.
    pub async fn build(
        &mut self,
        number: usize,
        ctx: &BuildContext<'_>,
        summary: &mut BuildSummary,
    ) -> Result<(), BuildError> {
        let console = ctx.console;
        console.heading(number, &self.name);
        console.info(1, &self.description);

        if !self.components.is_empty() {
            console.section("Setup component(s)");
            for component in &mut self.components {
                component.download(ctx.downloader, console, summary).await;
                component.install(&self.install_dir, console, summary).await;
            }
        }

        if !self.ini_files.is_empty() {
            console.section("Create ini file(s)");
            for ini in &self.ini_files {
                console.action(1, "- ", &format!("{} ({})", ini.description, ini.path.display()));
                match ini.write().await {
                    Ok(()) => summary.ini_written += 1,
                    Err(e) => {
                        warn!("{}", e);
                        console.error(2, &e.to_string());
                        summary.errors.push(e.to_string());
                    }
                }
            }
        }

        if !self.externals.is_empty() {
            console.section("Run external function(s)");
            for external in &self.externals {
                console.action(1, "- ", &external.description);
                external.run(ctx.registry, ctx.root).await?;
                summary.plugins_run += 1;
            }
        }

        debug!("Segment {} done", self.name);
        Ok(())
    }
}

fn join_optional(base: &Path, sub: Option<&str>) -> PathBuf {
    match sub {
        Some(sub) => base.join(sub),
        None => base.to_path_buf(),
    }
}
