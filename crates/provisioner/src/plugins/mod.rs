//! External plugin interface
//!
//! Manifest `external` steps name a function and hand it an opaque JSON
//! payload. Functions are looked up in a [`PluginRegistry`]: plugins
//! registered in-process win, and anything else falls back to running the
//! step's script file as a child process. A failing plugin aborts the build.

pub mod script;

pub use script::ScriptPlugin;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors raised by plugins
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("No plugin registered for function '{function}'")]
    NotFound { function: String },

    #[error("Failed to start script {script}: {source}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Script {script} failed in {function}() with {}", exit_description(*code))]
    Failed {
        script: PathBuf,
        function: String,
        code: Option<i32>,
    },

    #[error("{0}")]
    Plugin(String),
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Everything a plugin knows about the step that invoked it
#[derive(Debug, Clone, PartialEq)]
pub struct PluginContext {
    /// Script file named by the manifest, resolved against the base directory
    pub script: PathBuf,
    /// Function name from the manifest
    pub function: String,
    /// Root install directory of the build
    pub install_dir: PathBuf,
    /// Root download directory of the build
    pub download_dir: PathBuf,
}

/// A callable extension
#[async_trait]
pub trait ExternalPlugin: Send + Sync {
    async fn call(&self, ctx: &PluginContext, args: &Value) -> Result<(), PluginError>;
}

/// Adapter turning a plain function or closure into a plugin
pub struct FnPlugin<F>(pub F);

#[async_trait]
impl<F> ExternalPlugin for FnPlugin<F>
where
    F: Fn(&PluginContext, &Value) -> Result<(), PluginError> + Send + Sync,
{
    async fn call(&self, ctx: &PluginContext, args: &Value) -> Result<(), PluginError> {
        (self.0)(ctx, args)
    }
}

/// Named plugins, with an optional fallback for unregistered names
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn ExternalPlugin>>,
    fallback: Option<Arc<dyn ExternalPlugin>>,
}

impl PluginRegistry {
    /// Registry that runs unregistered functions as script processes
    pub fn new() -> Self {
        Self {
            plugins: HashMap::new(),
            fallback: Some(Arc::new(ScriptPlugin)),
        }
    }

    /// Registry that only knows explicitly registered plugins
    pub fn without_scripts() -> Self {
        Self {
            plugins: HashMap::new(),
            fallback: None,
        }
    }

    pub fn register<S, P>(mut self, name: S, plugin: P) -> Self
    where
        S: Into<String>,
        P: ExternalPlugin + 'static,
    {
        self.plugins.insert(name.into(), Arc::new(plugin));
        self
    }

    pub fn register_fn<S, F>(self, name: S, f: F) -> Self
    where
        S: Into<String>,
        F: Fn(&PluginContext, &Value) -> Result<(), PluginError> + Send + Sync + 'static,
    {
        self.register(name, FnPlugin(f))
    }

    /// Find the plugin that handles `function`
    pub fn resolve(&self, function: &str) -> Result<Arc<dyn ExternalPlugin>, PluginError> {
        if let Some(plugin) = self.plugins.get(function) {
            return Ok(plugin.clone());
        }
        self.fallback.clone().ok_or_else(|| PluginError::NotFound {
            function: function.to_string(),
        })
    }

    /// Invoke the plugin for `ctx.function`
    pub async fn run(&self, ctx: &PluginContext, args: &Value) -> Result<(), PluginError> {
        let plugin = self.resolve(&ctx.function)?;
        debug!("Calling {}() from {}", ctx.function, ctx.script.display());
        plugin.call(ctx, args).await
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
