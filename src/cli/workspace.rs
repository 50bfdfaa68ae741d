//! Workspace resolution and cleanup
//!
//! A workspace is the directory backing the store for one console run: either
//! a directory the user pointed at, or a directory an archive was extracted
//! into. Temporary workspaces are deleted exactly once, by an explicit
//! [`Workspace::release`] or on drop, whichever happens first.

use super::archive;
use crate::core::{ConsoleError, ConsoleResult};
use std::fs;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

const TEMP_DIR_PREFIX: &str = "docstore-console-";

#[derive(Debug)]
pub struct Workspace {
    source_path: PathBuf,
    resolved_directory: String,
    is_temporary: bool,
    is_archive: bool,
    released: bool,
}

impl Workspace {
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Store directory, ending with exactly one path separator.
    pub fn resolved_directory(&self) -> &str {
        &self.resolved_directory
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    pub fn is_archive(&self) -> bool {
        self.is_archive
    }

    /// Delete a temporary workspace. Best effort: failures are logged and
    /// the walk continues. Calling it again, or on a non-temporary
    /// workspace, does nothing.
    pub fn release(&mut self) {
        if !self.is_temporary || self.released {
            return;
        }
        self.released = true;

        let removed = remove_tree(Path::new(&self.resolved_directory));
        debug!(path = %self.resolved_directory, removed, "released temporary workspace");
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}

/// Resolve `input_path` into a workspace.
///
/// An existing directory is used in place. Anything else is treated as an
/// archive and extracted, either into `explicit_extract_dir` (which must be
/// absent or empty and is kept afterwards) or into a fresh temporary
/// directory that the returned workspace owns.
pub fn resolve(input_path: &Path, explicit_extract_dir: Option<&Path>) -> ConsoleResult<Workspace> {
    resolve_in(input_path, explicit_extract_dir, &std::env::temp_dir())
}

/// [`resolve`] with temporary workspaces created under `temp_root`.
pub fn resolve_in(
    input_path: &Path,
    explicit_extract_dir: Option<&Path>,
    temp_root: &Path,
) -> ConsoleResult<Workspace> {
    if input_path.is_dir() {
        return Ok(Workspace {
            source_path: input_path.to_path_buf(),
            resolved_directory: with_trailing_separator(input_path),
            is_temporary: false,
            is_archive: false,
            released: false,
        });
    }

    let (target, is_temporary) = match explicit_extract_dir {
        Some(dir) => {
            prepare_extract_dir(dir)?;
            (dir.to_path_buf(), false)
        }
        None => (create_temp_dir(temp_root)?, true),
    };

    // Owned from here on, so an extraction failure drops it and cleans up.
    let workspace = Workspace {
        source_path: input_path.to_path_buf(),
        resolved_directory: with_trailing_separator(&target),
        is_temporary,
        is_archive: true,
        released: false,
    };

    archive::extract_all(input_path, &target)?;
    Ok(workspace)
}

/// `dir` must not exist, or must be an empty directory.
fn prepare_extract_dir(dir: &Path) -> ConsoleResult<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir).map_err(|e| ConsoleError::CreateDirectory {
            path: dir.display().to_string(),
            reason: e.to_string(),
        });
    }

    let mut entries = fs::read_dir(dir).map_err(|e| ConsoleError::CreateDirectory {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    if entries.next().is_some() {
        return Err(ConsoleError::ExtractDirNotEmpty(dir.display().to_string()));
    }
    Ok(())
}

fn create_temp_dir(temp_root: &Path) -> ConsoleResult<PathBuf> {
    let dir = temp_root.join(format!("{}{}", TEMP_DIR_PREFIX, Uuid::new_v4()));
    fs::create_dir(&dir).map_err(|e| ConsoleError::CreateDirectory {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(dir)
}

/// `path` as a string with exactly one trailing separator.
pub fn with_trailing_separator(path: &Path) -> String {
    let raw = path.display().to_string();
    let trimmed = raw.trim_end_matches(|c: char| c == MAIN_SEPARATOR || c == '/');
    if trimmed.is_empty() {
        // The filesystem root
        return MAIN_SEPARATOR.to_string();
    }
    format!("{}{}", trimmed, MAIN_SEPARATOR)
}

/// Delete `root` and everything below it, deepest entries first. Returns the
/// number of entries removed.
fn remove_tree(root: &Path) -> usize {
    if !root.exists() {
        return 0;
    }

    let mut removed = 0;
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "cannot walk workspace entry");
                continue;
            }
        };

        let path = entry.path();
        let result = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        match result {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %path.display(), error = %e, "failed to delete workspace entry"),
        }
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_input_is_used_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let mut workspace = resolve(temp_dir.path(), None).unwrap();

        assert!(!workspace.is_temporary());
        assert!(!workspace.is_archive());
        assert!(workspace.resolved_directory().ends_with(MAIN_SEPARATOR));
        assert!(!workspace.resolved_directory().ends_with(&format!("{0}{0}", MAIN_SEPARATOR)));

        workspace.release();
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn test_trailing_separator_is_normalized() {
        assert_eq!(with_trailing_separator(Path::new("/data/store")), "/data/store/");
        assert_eq!(with_trailing_separator(Path::new("/data/store/")), "/data/store/");
        assert_eq!(with_trailing_separator(Path::new("/data/store//")), "/data/store/");
        assert_eq!(with_trailing_separator(Path::new("/")), "/");
    }

    #[test]
    fn test_non_empty_extract_dir_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("occupied"), b"x").unwrap();

        let err = resolve(&temp_dir.path().join("store.bak"), Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, ConsoleError::ExtractDirNotEmpty(_)));
    }

    #[test]
    fn test_release_removes_tree_once() {
        let dir = create_temp_dir(&std::env::temp_dir()).unwrap();
        std::fs::create_dir_all(dir.join("a/b")).unwrap();
        std::fs::write(dir.join("a/b/c.txt"), b"x").unwrap();

        let mut workspace = Workspace {
            source_path: PathBuf::from("store.bak"),
            resolved_directory: with_trailing_separator(&dir),
            is_temporary: true,
            is_archive: true,
            released: false,
        };
        workspace.release();
        assert!(!dir.exists());

        // Second call and the drop are both no-ops
        workspace.release();
        drop(workspace);
        assert!(!dir.exists());
    }

    #[test]
    fn test_remove_tree_on_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(remove_tree(&temp_dir.path().join("gone")), 0);
    }
}
