//! Script fallback plugin
//!
//! Runs the manifest's script file as a child process:
//!
//! ```text
//! <script> <function> <args as JSON>
//! ```
//!
//! The script is executed directly, so it needs to be executable (a shebang
//! line for interpreted scripts). The manifest author is trusted.

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::debug;

use crate::plugins::{ExternalPlugin, PluginContext, PluginError};

#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptPlugin;

#[async_trait]
impl ExternalPlugin for ScriptPlugin {
    async fn call(&self, ctx: &PluginContext, args: &Value) -> Result<(), PluginError> {
        let payload = args.to_string();
        debug!("Running {} {} {}", ctx.script.display(), ctx.function, payload);

        let status = Command::new(&ctx.script)
            .arg(&ctx.function)
            .arg(&payload)
            .status()
            .await
            .map_err(|source| PluginError::Spawn {
                script: ctx.script.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PluginError::Failed {
                script: ctx.script.clone(),
                function: ctx.function.clone(),
                code: status.code(),
            })
        }
    }
}
