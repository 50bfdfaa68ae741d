//! The interactive console around the store: workspace preparation,
//! history, line editing and batch execution.

pub mod app;
pub mod archive;
pub mod args;
pub mod autocomplete;
pub mod dispatcher;
pub mod editor;
pub mod formatter;
pub mod history;
pub mod workspace;

pub use app::{InteractiveSession, SessionState, SessionSummary};
pub use args::Args;
pub use dispatcher::{BatchDispatcher, BatchReport, QueryEngine, QueryOutcome};
pub use editor::{LineEditor, PipedEditor, ReadOutcome, RustylineEditor};
pub use history::{HistoryEntry, HistoryStore};
pub use workspace::Workspace;
