//! Manifest loading
//!
//! A manifest lives at `<base>/cfg/sd/<id1>/<id2>.json`. Its top level is an
//! object whose `"root"` key holds global settings and whose other keys are
//! segments, kept in declaration order.

pub mod error;
pub mod parser;

pub use error::ManifestError;
pub use parser::{
    ComponentSpec, ExternalSpec, FunctionRef, GithubSpec, IniSpec, RootSpec, SegmentSpec,
};

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Key holding the root configuration
pub const ROOT_KEY: &str = "root";

/// A parsed manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    /// File the manifest was read from
    pub path: PathBuf,
    pub root: RootSpec,
    /// Segments by name, in declaration order
    pub segments: Vec<(String, SegmentSpec)>,
}

/// Location of a manifest below `base`
pub fn manifest_path(base: &Path, id1: &str, id2: &str) -> PathBuf {
    base.join("cfg").join("sd").join(id1).join(format!("{}.json", id2))
}

/// Read and parse the manifest at `path`
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound { path: path.to_path_buf() }
        } else {
            ManifestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest = parse_manifest(path, &value)?;
    debug!("Loaded manifest {} with {} segment(s)", path.display(), manifest.segments.len());
    Ok(manifest)
}

/// Split a manifest document into root settings and ordered segments
pub fn parse_manifest(path: &Path, value: &Value) -> Result<Manifest, ManifestError> {
    let Value::Object(entries) = value else {
        return Err(ManifestError::NotAnObject);
    };

    let mut root = RootSpec::default();
    let mut segments = Vec::with_capacity(entries.len());

    for (name, entry) in entries {
        let invalid = |source| ManifestError::InvalidSegment {
            name: name.clone(),
            source,
        };

        if name == ROOT_KEY {
            root = RootSpec::deserialize(entry).map_err(invalid)?;
        } else {
            segments.push((name.clone(), SegmentSpec::deserialize(entry).map_err(invalid)?));
        }
    }

    Ok(Manifest {
        path: path.to_path_buf(),
        root,
        segments,
    })
}
