//! Direct URL download source

use crate::downloader::sources::ResolvedFile;

/// A file downloaded straight from the configured URL
#[derive(Debug, Clone, PartialEq)]
pub struct HttpSource {
    pub url: String,
}

impl HttpSource {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into() }
    }

    /// A direct source always resolves to exactly its own URL
    pub fn resolve(&self) -> Vec<ResolvedFile> {
        vec![ResolvedFile {
            url: self.url.clone(),
            asset_name: None,
        }]
    }
}
