//! External plugin steps

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::build::error::BuildError;
use crate::build::root::RootConfig;
use crate::manifest::{ExternalSpec, FunctionRef};
use crate::plugins::{PluginContext, PluginRegistry};

/// One `external` entry of a segment
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalStep {
    /// Script path, resolved against the base directory
    pub script: PathBuf,
    pub description: String,
    pub function: FunctionRef,
    pub args: Value,
}

impl ExternalStep {
    pub fn from_spec(spec: &ExternalSpec, base_dir: &Path) -> Self {
        let description = if spec.description.is_empty() {
            spec.function
                .description
                .clone()
                .unwrap_or_else(|| format!("Run {}()", spec.function.name))
        } else {
            spec.description.clone()
        };

        Self {
            script: base_dir.join(&spec.path),
            description,
            function: spec.function.clone(),
            args: spec.args.clone(),
        }
    }

    /// Call the plugin; any failure aborts the build
    pub async fn run(&self, registry: &PluginRegistry, root: &RootConfig) -> Result<(), BuildError> {
        let ctx = PluginContext {
            script: self.script.clone(),
            function: self.function.name.clone(),
            install_dir: root.install_dir.clone(),
            download_dir: root.download_dir.clone(),
        };

        registry
            .run(&ctx, &self.args)
            .await
            .map_err(|source| BuildError::External {
                function: self.function.name.clone(),
                source,
            })
    }
}
