//! FromArchive directive implementation
//!
//! Handles unpacking a downloaded zip into the segment install directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::ZipArchive;

use crate::install::error::InstallError;

/// Unpack every entry of a zip archive into a directory
#[derive(Debug, Clone, PartialEq)]
pub struct FromArchive {
    /// The downloaded archive
    pub archive: PathBuf,
}

impl FromArchive {
    pub fn new(archive: PathBuf) -> Self {
        Self { archive }
    }

    /// Execute the directive - extract all entries into `install_dir`
    ///
    /// Returns the number of entries in the archive. Existing files are
    /// overwritten; entries whose names would escape `install_dir` are
    /// rejected by the zip reader.
    pub async fn execute(&self, install_dir: &Path) -> Result<usize, InstallError> {
        let archive_path = self.archive.clone();
        let dest = install_dir.to_path_buf();

        tokio::task::spawn_blocking(move || extract_all(&archive_path, &dest))
            .await
            .map_err(|e| InstallError::Task(e.to_string()))?
    }
}

fn extract_all(archive_path: &Path, dest: &Path) -> Result<usize, InstallError> {
    std::fs::create_dir_all(dest).map_err(|e| InstallError::io(dest, e))?;

    let file = File::open(archive_path).map_err(|e| InstallError::io(archive_path, e))?;
    let zip_error = |source| InstallError::Zip {
        archive: archive_path.to_path_buf(),
        source,
    };

    let mut archive = ZipArchive::new(file).map_err(zip_error)?;
    let entries = archive.len();
    archive.extract(dest).map_err(zip_error)?;

    debug!("Extracted {} entries from {} to {}", entries, archive_path.display(), dest.display());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, data) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_extracts_nested_entries() {
        let temp_dir = tempdir().unwrap();
        let archive = temp_dir.path().join("atmosphere.zip");
        write_zip(&archive, &[
            ("atmosphere/package3", b"pkg3"),
            ("switch/daybreak.nro", b"nro"),
        ]);
        let sd = temp_dir.path().join("sd");

        let count = FromArchive::new(archive).execute(&sd).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(std::fs::read(sd.join("atmosphere/package3")).unwrap(), b"pkg3");
        assert_eq!(std::fs::read(sd.join("switch/daybreak.nro")).unwrap(), b"nro");
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_zip_error() {
        let temp_dir = tempdir().unwrap();
        let archive = temp_dir.path().join("broken.zip");
        std::fs::write(&archive, b"definitely not a zip").unwrap();

        let err = FromArchive::new(archive).execute(&temp_dir.path().join("sd")).await.unwrap_err();

        assert!(matches!(err, InstallError::Zip { .. }));
    }

    #[tokio::test]
    async fn test_missing_archive_is_io_error() {
        let temp_dir = tempdir().unwrap();
        let err = FromArchive::new(temp_dir.path().join("nope.zip"))
            .execute(temp_dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, InstallError::Io { .. }));
    }
}
