//! Root configuration

use std::path::PathBuf;

use crate::manifest::RootSpec;

/// Global settings every segment resolves its paths against
#[derive(Debug, Clone, PartialEq)]
pub struct RootConfig {
    pub download_dir: PathBuf,
    pub install_dir: PathBuf,
    /// Indentation width for console output
    pub indent: usize,
    pub description: String,
}

impl From<&RootSpec> for RootConfig {
    fn from(spec: &RootSpec) -> Self {
        Self {
            download_dir: PathBuf::from(&spec.dl),
            install_dir: PathBuf::from(&spec.sd),
            indent: spec.tab,
            description: spec.description.clone(),
        }
    }
}

impl RootConfig {
    /// Labelled root directories, as shown before a build starts
    pub fn locations(&self) -> [(&'static str, String); 2] {
        [
            ("Download: ", display_dir(&self.download_dir)),
            ("SD card: ", display_dir(&self.install_dir)),
        ]
    }
}

fn display_dir(dir: &std::path::Path) -> String {
    if dir.as_os_str().is_empty() {
        "(current directory)".to_string()
    } else {
        dir.display().to_string()
    }
}

impl Default for RootConfig {
    fn default() -> Self {
        Self::from(&RootSpec::default())
    }
}
