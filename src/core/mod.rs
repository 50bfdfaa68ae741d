pub mod document;
pub mod error;

pub use document::{Document, RecordId};
pub use error::{ConsoleError, ConsoleResult, DbError, Result};
