//! CopyFile directive implementation
//!
//! Handles single-file payloads (payload binaries, homebrew apps, overlays)
//! that are placed as-is.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::install::error::InstallError;

/// Copy a downloaded file into the component install directory
#[derive(Debug, Clone, PartialEq)]
pub struct CopyFile {
    /// The downloaded file
    pub source: PathBuf,
    /// Name kept at the destination
    pub filename: String,
}

impl CopyFile {
    pub fn new(source: PathBuf, filename: String) -> Self {
        Self { source, filename }
    }

    /// Execute the directive - copy the file into `install_dir`
    ///
    /// Returns the destination path and whether it exists right after the copy.
    pub async fn execute(&self, install_dir: &Path) -> Result<(PathBuf, bool), InstallError> {
        let destination = install_dir.join(&self.filename);

        fs::create_dir_all(install_dir)
            .await
            .map_err(|e| InstallError::io(install_dir, e))?;

        fs::copy(&self.source, &destination)
            .await
            .map_err(|source| InstallError::CopyFailed {
                from: self.source.clone(),
                to: destination.clone(),
                source,
            })?;

        let verified = fs::metadata(&destination)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);

        Ok((destination, verified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_copy_preserves_name_and_content() {
        let temp_dir = tempdir().unwrap();
        let source = temp_dir.path().join("dl").join("ovlmenu.ovl");
        std::fs::create_dir_all(source.parent().unwrap()).unwrap();
        std::fs::write(&source, b"overlay").unwrap();
        let sd = temp_dir.path().join("sd/switch/.overlays");

        let (dest, verified) = CopyFile::new(source, "ovlmenu.ovl".to_string())
            .execute(&sd)
            .await
            .unwrap();

        assert!(verified);
        assert_eq!(dest, sd.join("ovlmenu.ovl"));
        assert_eq!(std::fs::read(dest).unwrap(), b"overlay");
    }

    #[tokio::test]
    async fn test_copy_missing_source_fails() {
        let temp_dir = tempdir().unwrap();
        let err = CopyFile::new(temp_dir.path().join("gone.bin"), "gone.bin".to_string())
            .execute(temp_dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::CopyFailed { .. }));
    }
}
