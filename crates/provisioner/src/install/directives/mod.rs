//! Installation directive implementations
//!
//! A directive is chosen per downloaded file from its extension. Each
//! directive type is defined in its own file along with its execute method.

pub mod copy_file;
pub mod from_archive;

pub use copy_file::CopyFile;
pub use from_archive::FromArchive;

use std::path::Path;

use crate::install::error::InstallError;
use crate::install::{InstallContext, InstallOutcome};

/// Extensions installed by copying the file unchanged
pub const COPY_EXTENSIONS: [&str; 4] = ["bin", "nro", "config", "ovl"];

/// Extension unpacked into the install tree
pub const ARCHIVE_EXTENSION: &str = "zip";

/// What to do with one downloaded file
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Unpack a zip archive
    FromArchive(FromArchive),
    /// Copy a single file
    CopyFile(CopyFile),
    /// Unknown file type, left alone
    NoMatch { filename: String },
}

impl Directive {
    /// Pick the directive for `filename` located in `download_dir`
    ///
    /// Extension matching is case-sensitive.
    pub fn for_file(download_dir: &Path, filename: &str) -> Self {
        let source = download_dir.join(filename);
        let extension = Path::new(filename).extension().and_then(|e| e.to_str());

        match extension {
            Some(ARCHIVE_EXTENSION) => Directive::FromArchive(FromArchive::new(source)),
            Some(ext) if COPY_EXTENSIONS.contains(&ext) => {
                Directive::CopyFile(CopyFile::new(source, filename.to_string()))
            }
            _ => Directive::NoMatch {
                filename: filename.to_string(),
            },
        }
    }

    pub async fn execute(&self, ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
        match self {
            Directive::FromArchive(d) => {
                let entries = d.execute(&ctx.archive_dir).await?;
                Ok(InstallOutcome::Extracted {
                    destination: ctx.archive_dir.clone(),
                    entries,
                })
            }
            Directive::CopyFile(d) => {
                let (destination, verified) = d.execute(&ctx.install_dir).await?;
                Ok(InstallOutcome::Copied { destination, verified })
            }
            Directive::NoMatch { filename } => Ok(InstallOutcome::Skipped {
                filename: filename.clone(),
            }),
        }
    }
}
