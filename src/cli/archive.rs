//! Archive extraction for zipped store snapshots.

use crate::core::{ConsoleError, ConsoleResult};
use std::fs::File;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

/// Extract every entry of `archive_path` into `dest_dir`, creating
/// intermediate directories as needed.
pub fn extract_all(archive_path: &Path, dest_dir: &Path) -> ConsoleResult<()> {
    let extraction_error = |reason: String| ConsoleError::Extraction {
        path: archive_path.display().to_string(),
        reason,
    };

    let file = File::open(archive_path).map_err(|e| extraction_error(e.to_string()))?;
    let mut archive = ZipArchive::new(file).map_err(|e| extraction_error(e.to_string()))?;
    debug!(entries = archive.len(), dest = %dest_dir.display(), "extracting archive");

    archive
        .extract(dest_dir)
        .map_err(|e| extraction_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    #[test]
    fn test_extract_nested_entries() {
        let temp_dir = TempDir::new().unwrap();
        let archive_path = temp_dir.path().join("store.bak");
        {
            let mut writer = zip::ZipWriter::new(File::create(&archive_path).unwrap());
            writer
                .start_file("person.class.json", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"{}").unwrap();
            writer
                .start_file("nested/deeper/file.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"x").unwrap();
            writer.finish().unwrap();
        }

        let dest = temp_dir.path().join("out");
        std::fs::create_dir(&dest).unwrap();
        extract_all(&archive_path, &dest).unwrap();

        assert!(dest.join("person.class.json").is_file());
        assert!(dest.join("nested/deeper/file.txt").is_file());
    }

    #[test]
    fn test_not_an_archive() {
        let temp_dir = TempDir::new().unwrap();
        let bogus = temp_dir.path().join("bogus.bak");
        std::fs::write(&bogus, b"definitely not a zip").unwrap();

        let err = extract_all(&bogus, temp_dir.path()).unwrap_err();
        assert!(matches!(err, ConsoleError::Extraction { .. }));
    }
}
