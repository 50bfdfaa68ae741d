use clap::Parser;
use std::path::PathBuf;

pub const HISTORY_FILE_NAME: &str = ".docstore-console_history";

/// Interactive console for an embedded document store, opened from a
/// directory or from a zip backup.
#[derive(Parser, Debug)]
#[command(name = "docstore-console", version, about)]
pub struct Args {
    /// Store directory, or a zip archive of one
    pub path: PathBuf,

    /// Where to extract an archive. Must be absent or empty; kept after exit.
    /// Without it the archive goes to a temporary directory removed on exit.
    pub extract_dir: Option<PathBuf>,

    /// Statement history file
    #[arg(long, env = "DOCSTORE_CONSOLE_HISTORY")]
    pub history_file: Option<PathBuf>,
}

impl Args {
    pub fn history_path(&self) -> PathBuf {
        self.history_file.clone().unwrap_or_else(default_history_path)
    }
}

/// `$HOME/.docstore-console_history`, or the current directory without a home.
pub fn default_history_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HISTORY_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positionals() {
        let args = Args::try_parse_from(["docstore-console", "backup.zip", "/tmp/out"]).unwrap();
        assert_eq!(args.path, PathBuf::from("backup.zip"));
        assert_eq!(args.extract_dir, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_history_file_flag() {
        let args =
            Args::try_parse_from(["docstore-console", "db", "--history-file", "/tmp/h"]).unwrap();
        assert_eq!(args.history_path(), PathBuf::from("/tmp/h"));
    }

    #[test]
    fn test_missing_path_is_an_error() {
        assert!(Args::try_parse_from(["docstore-console"]).is_err());
    }

    #[test]
    fn test_default_history_name() {
        assert!(default_history_path().ends_with(HISTORY_FILE_NAME));
    }
}
