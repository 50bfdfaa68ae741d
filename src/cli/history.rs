//! Statement history file
//!
//! One entry per line in the form `<index>:<text>`. Entries are only ever
//! appended, except for the corrective rewrite that drops statements the
//! store rejected.

use crate::core::{ConsoleError, ConsoleResult};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Keywords offered for completion before any history exists.
pub const SEED_KEYWORDS: &[&str] = &[
    "CREATE",
    "SELECT FROM",
    "UPDATE",
    "INSERT INTO",
    "DELETE FROM",
    "FROM",
    "WHERE",
    "BETWEEN",
    "AND",
    "DISTINCT",
    "LIKE",
    "LIMIT",
    "NOT",
];

const TOKEN_DELIMITERS: &[char] = &[' ', ',', '.', ';', ':', '"'];

lazy_static! {
    static ref ENTRY_LINE: Regex = Regex::new(r"^([0-9]+):(.*)$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub index: u64,
    pub text: String,
}

impl HistoryEntry {
    fn parse(line: &str) -> Option<Self> {
        let caps = ENTRY_LINE.captures(line)?;
        let index = caps[1].parse().ok()?;
        Some(Self {
            index,
            text: caps[2].to_string(),
        })
    }
}

pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Open the history at `path`. A missing file is an empty history.
    pub fn open(path: impl Into<PathBuf>) -> ConsoleResult<Self> {
        let mut store = Self {
            path: path.into(),
            entries: Vec::new(),
        };
        store.reload()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-read the file into memory.
    pub fn reload(&mut self) -> ConsoleResult<()> {
        self.entries = read_entries(&self.path).map_err(|e| {
            ConsoleError::History(format!("Cannot read {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }

    /// Append `text` under the next free index and sync it to disk.
    pub fn append(&mut self, text: &str) -> ConsoleResult<HistoryEntry> {
        let index = self.entries.iter().map(|e| e.index).max().map_or(1, |max| max + 1);
        let entry = HistoryEntry {
            index,
            text: text.to_string(),
        };

        let write = || -> io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
            writeln!(file, "{}:{}", entry.index, entry.text)?;
            file.sync_all()
        };
        write().map_err(|e| {
            ConsoleError::History(format!("Cannot write {}: {}", self.path.display(), e))
        })?;

        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Drop every line whose text is exactly `text`, keeping the order and
    /// indices of the others. Returns the number of lines removed; failures
    /// are logged and count as nothing removed.
    ///
    /// The in-memory entries are left alone until the next [`reload`].
    ///
    /// [`reload`]: HistoryStore::reload
    pub fn remove_matching(&self, text: &str) -> usize {
        match self.rewrite_without(text) {
            Ok(removed) => {
                debug!(removed, "removed rejected statement from history");
                removed
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to rewrite history file");
                0
            }
        }
    }

    fn rewrite_without(&self, text: &str) -> io::Result<usize> {
        if !self.path.exists() {
            return Ok(0);
        }

        let pattern = Regex::new(&format!("^[0-9]+:{}$", regex::escape(text)))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(&dir)?;

        let mut removed = 0;
        {
            let reader = BufReader::new(File::open(&self.path)?);
            let mut writer = BufWriter::new(temp.as_file());
            for line in reader.lines() {
                let line = line?;
                if pattern.is_match(&line) {
                    removed += 1;
                    continue;
                }
                writeln!(writer, "{}", line)?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| e.error)?;
        Ok(removed)
    }
}

fn read_entries(path: &Path) -> io::Result<Vec<HistoryEntry>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut entries = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        match HistoryEntry::parse(&line) {
            Some(entry) => entries.push(entry),
            None => debug!(line = %line, "skipping malformed history line"),
        }
    }
    Ok(entries)
}

/// Completion vocabulary: the seed keywords plus every purely alphabetic
/// token found in the history file.
pub fn harvest_completion_words(path: &Path) -> BTreeSet<String> {
    let mut words: BTreeSet<String> = SEED_KEYWORDS.iter().map(|w| w.to_string()).collect();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no history file yet");
            return words;
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read history for completion");
            return words;
        }
    };

    for line in content.lines() {
        words.extend(
            line.split(TOKEN_DELIMITERS)
                .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_alphabetic()))
                .map(str::to_string),
        );
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = HistoryStore::open(temp_dir.path().join("history")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_then_reload_keeps_increasing_indices() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history");

        let mut store = HistoryStore::open(&path).unwrap();
        for i in 0..5 {
            store.append(&format!("SELECT FROM c{}", i)).unwrap();
        }

        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 5);
        let indices: Vec<u64> = reopened.entries().iter().map(|e| e.index).collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(reopened.entries()[2].text, "SELECT FROM c2");
    }

    #[test]
    fn test_next_index_follows_largest_present() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history");
        fs::write(&path, "4:a\n9:b\n2:c\n").unwrap();

        let mut store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.append("d").unwrap().index, 10);
    }

    #[test]
    fn test_remove_matching_keeps_other_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history");
        fs::write(&path, "1:foo\n2:bad stmt\n3:bar\n").unwrap();

        let mut store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.remove_matching("bad stmt"), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "1:foo\n3:bar\n");

        store.reload().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_matching_is_literal() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history");
        fs::write(&path, "1:select * from x\n2:select a from x\n3:select * from x extra\n").unwrap();

        let store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.remove_matching("select * from x"), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "2:select a from x\n3:select * from x extra\n"
        );
    }

    #[test]
    fn test_remove_matching_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = HistoryStore::open(temp_dir.path().join("history")).unwrap();
        assert_eq!(store.remove_matching("anything"), 0);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history");
        fs::write(&path, "1:ok\nno index here\n:empty\n2:also ok\n").unwrap();

        let store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_harvest_completion_words() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("history");
        fs::write(&path, "1:select name from Person where age > 30;\n2:Person.name,\"city\"\n").unwrap();

        let words = harvest_completion_words(&path);
        for expected in ["SELECT FROM", "WHERE", "select", "Person", "name", "city", "age"] {
            assert!(words.contains(expected), "missing {}", expected);
        }
        assert!(!words.contains("30"));
        assert!(!words.contains(">"));
        assert!(!words.contains("1"));
    }

    #[test]
    fn test_harvest_without_history_returns_seeds() {
        let temp_dir = TempDir::new().unwrap();
        let words = harvest_completion_words(&temp_dir.path().join("history"));
        assert_eq!(words.len(), SEED_KEYWORDS.len());
    }
}
