//! Manifest JSON shapes
//!
//! These structs mirror the manifest file one-to-one. Every field is
//! optional in the file; defaults are applied here so the build model never
//! sees a missing key.

use serde::Deserialize;
use serde_json::Value;

use crate::downloader::sources::github::DEFAULT_QUERY;

/// Indentation width used when the root does not set `tab`
pub const DEFAULT_INDENT: usize = 2;

/// The reserved `"root"` object
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RootSpec {
    /// Base download directory
    pub dl: String,
    /// Base install directory (the SD card root)
    pub sd: String,
    /// Indentation width for console output
    pub tab: usize,
    pub description: String,
}

impl Default for RootSpec {
    fn default() -> Self {
        Self {
            dl: String::new(),
            sd: String::new(),
            tab: DEFAULT_INDENT,
            description: String::new(),
        }
    }
}

/// Any non-root entry of the manifest
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SegmentSpec {
    pub description: Option<String>,
    /// Sub-path below the root download directory
    pub dl: Option<String>,
    /// Sub-path below the root install directory
    pub sd: Option<String>,
    pub component: Vec<ComponentSpec>,
    pub ini: Vec<IniSpec>,
    pub external: Vec<ExternalSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ComponentSpec {
    pub name: String,
    pub description: String,
    pub github: Option<GithubSpec>,
    pub url: Option<String>,
    /// Extra asset patterns, tried after the GitHub ones
    pub regex: Vec<String>,
    #[serde(rename = "isDisabled")]
    pub is_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GithubSpec {
    pub repo: String,
    pub query: String,
    pub regex: Vec<String>,
}

impl Default for GithubSpec {
    fn default() -> Self {
        Self {
            repo: String::new(),
            query: DEFAULT_QUERY.to_string(),
            regex: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IniSpec {
    /// Target path, relative to the root install directory
    pub path: Option<String>,
    pub description: Option<String>,
    pub line: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalSpec {
    #[serde(default = "default_script_path")]
    pub path: String,
    #[serde(default)]
    pub description: String,
    pub function: FunctionRef,
    #[serde(default)]
    pub args: Value,
}

fn default_script_path() -> String {
    "custom.py".to_string()
}

/// Name of the plugin function an external step calls
///
/// Accepts either `"function": "name"` or
/// `"function": {"name": "...", "description": "..."}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawFunction")]
pub struct FunctionRef {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFunction {
    Name(String),
    Described {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<RawFunction> for FunctionRef {
    fn from(raw: RawFunction) -> Self {
        match raw {
            RawFunction::Name(name) => FunctionRef { name, description: None },
            RawFunction::Described { name, description } => FunctionRef { name, description },
        }
    }
}
