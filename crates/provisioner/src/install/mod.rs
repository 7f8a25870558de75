//! Installation module
//!
//! Installs downloaded files into the install tree by file extension: zip
//! archives are unpacked, a fixed set of single-file types is copied, and
//! everything else is skipped.

pub mod directives;
pub mod error;

pub use directives::{ARCHIVE_EXTENSION, COPY_EXTENSIONS, Directive};
pub use error::InstallError;

use std::path::PathBuf;

/// Directories an install writes into
#[derive(Debug, Clone, PartialEq)]
pub struct InstallContext {
    /// Where the component's files were downloaded
    pub download_dir: PathBuf,
    /// Destination for copied single files
    pub install_dir: PathBuf,
    /// Destination for unpacked archives
    pub archive_dir: PathBuf,
}

/// What happened to one downloaded file
#[derive(Debug, Clone, PartialEq)]
pub enum InstallOutcome {
    Extracted { destination: PathBuf, entries: usize },
    /// `verified` is true when the destination exists right after the copy
    Copied { destination: PathBuf, verified: bool },
    /// Unknown file type; nothing was written
    Skipped { filename: String },
}

/// Install one file from `ctx.download_dir`
pub async fn install_file(filename: &str, ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    Directive::for_file(&ctx.download_dir, filename).execute(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_unknown_type_touches_nothing() {
        let temp_dir = tempdir().unwrap();
        let dl = temp_dir.path().join("dl");
        let sd = temp_dir.path().join("sd");
        std::fs::create_dir_all(&dl).unwrap();
        std::fs::create_dir_all(&sd).unwrap();
        std::fs::write(dl.join("release.7z"), b"7z").unwrap();

        let ctx = InstallContext {
            download_dir: dl,
            install_dir: sd.clone(),
            archive_dir: sd.clone(),
        };
        let outcome = install_file("release.7z", &ctx).await.unwrap();

        assert_eq!(outcome, InstallOutcome::Skipped { filename: "release.7z".to_string() });
        assert_eq!(std::fs::read_dir(&sd).unwrap().count(), 0);
    }
}
