//! Literal ini file writer

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::build::error::BuildError;
use crate::manifest::IniSpec;

const DEFAULT_DESCRIPTION: &str = "Create config.ini";

/// A file whose content is exactly the manifest's lines
#[derive(Debug, Clone, PartialEq)]
pub struct IniFile {
    pub path: PathBuf,
    pub description: String,
    pub lines: Vec<String>,
}

impl IniFile {
    /// Resolve an ini entry against the root install directory
    ///
    /// Without a `path` the file gets a random `<uuid>.ini` name, fixed for
    /// the lifetime of this value.
    pub fn from_spec(spec: &IniSpec, install_root: &Path) -> Self {
        let relative = match &spec.path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(format!("{}.ini", Uuid::new_v4())),
        };

        Self {
            path: install_root.join(relative),
            description: spec
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            lines: spec.line.clone(),
        }
    }

    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// Write the file, replacing any previous content
    pub async fn write(&self) -> Result<(), BuildError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BuildError::io(parent, e))?;
        }

        fs::write(&self.path, self.content())
            .await
            .map_err(|e| BuildError::io(&self.path, e))?;

        debug!("Wrote {} line(s) to {}", self.lines.len(), self.path.display());
        Ok(())
    }
}
