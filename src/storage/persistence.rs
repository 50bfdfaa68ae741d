//! Class-file persistence for the document store
//!
//! Each class lives in `<dir>/<name>.class.json`. Writes go to a temporary
//! file in the same directory which is then renamed over the target, so a
//! crash leaves either the old or the new class file, never a torn one.

use crate::core::{DbError, Result};
use crate::storage::DocumentClass;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const CLASS_FILE_SUFFIX: &str = ".class.json";

pub struct ClassFileStore {
    dir: PathBuf,
}

impl ClassFileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn class_path(&self, class_name: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", class_name.to_lowercase(), CLASS_FILE_SUFFIX))
    }

    /// Load every class file found in the store directory.
    pub fn load_all(&self) -> Result<Vec<DocumentClass>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| {
            DbError::StorageError(format!("Cannot read {}: {}", self.dir.display(), e))
        })?;

        let mut classes = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_class_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(CLASS_FILE_SUFFIX));
            if !is_class_file || !path.is_file() {
                continue;
            }

            let file = File::open(&path)?;
            let class: DocumentClass = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| {
                    DbError::StorageError(format!("Corrupt class file {}: {}", path.display(), e))
                })?;
            debug!(class = class.name(), records = class.len(), "loaded class");
            classes.push(class);
        }

        classes.sort_by_key(|c| c.cluster_id());
        Ok(classes)
    }

    pub fn save(&self, class: &DocumentClass) -> Result<()> {
        let temp = NamedTempFile::new_in(&self.dir)
            .map_err(|e| DbError::StorageError(format!("Failed to create temp file: {}", e)))?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, class)?;
            writer
                .flush()
                .map_err(|e| DbError::StorageError(format!("Failed to flush class file: {}", e)))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| DbError::StorageError(format!("Failed to sync class file: {}", e)))?;

        let target = self.class_path(class.name());
        temp.persist(&target).map_err(|e| {
            DbError::StorageError(format!("Failed to replace {}: {}", target.display(), e))
        })?;
        Ok(())
    }

    pub fn delete(&self, class_name: &str) -> Result<()> {
        let path = self.class_path(class_name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                DbError::StorageError(format!("Failed to delete {}: {}", path.display(), e))
            })?;
        }
        Ok(())
    }
}
