// ============================================================================
// docstore-console library
// ============================================================================

pub mod cli;
pub mod connection;
pub mod core;
pub mod facade;
mod evaluator;
mod executor;
mod parser;
mod storage;

pub use connection::{ConnectionDescriptor, build_descriptor};
pub use core::{ConsoleError, ConsoleResult, DbError, Document, RecordId, Result};
pub use facade::DocumentDb;
