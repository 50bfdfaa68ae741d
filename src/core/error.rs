use thiserror::Error;

/// Errors raised by the embedded document store.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No executor found for command '{0}'")]
    ExecutorNotFound(String),

    #[error("Class '{0}' already exists")]
    ClassExists(String),

    #[error("Class '{0}' not found")]
    ClassNotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Authentication failed for user '{0}'")]
    AuthError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DbError {
    /// The statement text itself was not valid input: it could not be parsed,
    /// or no executor handles its command verb.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::ParseError(_) | Self::ExecutorNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

/// Errors raised by the console around the store: argument handling,
/// workspace preparation, history and the line editor.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Couldn't create {path}: {reason}")]
    CreateDirectory { path: String, reason: String },

    #[error("{0} is not empty.")]
    ExtractDirNotEmpty(String),

    #[error("{path} is not a right archive: {reason}")]
    Extraction { path: String, reason: String },

    #[error("Failed to open database: {0}")]
    Connection(#[from] DbError),

    #[error("History error: {0}")]
    History(String),

    #[error("Line editor error: {0}")]
    Editor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConsoleResult<T> = std::result::Result<T, ConsoleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        assert!(DbError::ParseError("x".into()).is_rejection());
        assert!(DbError::ExecutorNotFound("ALTER".into()).is_rejection());
        assert!(!DbError::ClassNotFound("v".into()).is_rejection());
        assert!(!DbError::IoError("disk".into()).is_rejection());
    }
}
