//! Batch execution of one input line
//!
//! A line may carry several `;` separated statements. They run strictly in
//! order; each result is written and flushed before the next statement
//! starts. A statement the store rejects as invalid input is removed from
//! the history file so it is not offered for recall again.

use super::editor::LineEditor;
use super::formatter;
use super::history::HistoryStore;
use crate::core::{ConsoleResult, DbError, Document};
use crate::facade::DocumentDb;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, warn};

/// Result of running one statement.
#[derive(Debug)]
pub enum QueryOutcome {
    Documents(Vec<Document>),
    /// The statement could not be parsed or no executor handles it.
    Rejected(DbError),
    Failed(DbError),
}

impl From<crate::core::Result<Vec<Document>>> for QueryOutcome {
    fn from(result: crate::core::Result<Vec<Document>>) -> Self {
        match result {
            Ok(documents) => Self::Documents(documents),
            Err(e) if e.is_rejection() => Self::Rejected(e),
            Err(e) => Self::Failed(e),
        }
    }
}

/// Anything that can run a single statement.
pub trait QueryEngine {
    fn run(&mut self, statement: &str) -> QueryOutcome;
}

impl QueryEngine for DocumentDb {
    fn run(&mut self, statement: &str) -> QueryOutcome {
        self.execute(statement).into()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub statements: usize,
    pub succeeded: usize,
    pub rejected: usize,
    pub failed: usize,
    pub history_corrected: bool,
}

/// Statements of `line`, trimmed, blank ones dropped.
pub fn split_batch(line: &str) -> Vec<&str> {
    line.split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
        .collect()
}

pub struct BatchDispatcher {
    out: Box<dyn Write>,
    diag: Box<dyn Write>,
}

impl BatchDispatcher {
    pub fn new(out: Box<dyn Write>, diag: Box<dyn Write>) -> Self {
        Self { out, diag }
    }

    /// Diagnostic stream, shared with the session for its own messages.
    pub fn diag(&mut self) -> &mut dyn Write {
        self.diag.as_mut()
    }

    pub fn execute(
        &mut self,
        line: &str,
        engine: &mut dyn QueryEngine,
        history: &mut HistoryStore,
        editor: &mut dyn LineEditor,
    ) -> ConsoleResult<BatchReport> {
        let mut report = BatchReport::default();

        for statement in split_batch(line) {
            report.statements += 1;
            let start = Instant::now();

            let outcome = engine.run(statement);
            let elapsed = start.elapsed();

            match outcome {
                QueryOutcome::Documents(documents) => {
                    formatter::write_documents(self.out.as_mut(), &documents)?;
                    self.out.flush()?;
                    writeln!(self.diag, "Elapsed: {} ms", elapsed.as_millis())?;
                    report.succeeded += 1;
                }
                QueryOutcome::Rejected(e) => {
                    writeln!(self.diag, "Rejected: {}", e)?;
                    report.rejected += 1;
                    if !report.history_corrected {
                        correct_history(line, history, editor);
                        report.history_corrected = true;
                    }
                }
                QueryOutcome::Failed(e) => {
                    writeln!(self.diag, "Error: {}", e)?;
                    report.failed += 1;
                }
            }
            self.diag.flush()?;
        }

        debug!(?report, "batch finished");
        Ok(report)
    }
}

/// Drop `line` from the history file and resync the editor's recall list.
fn correct_history(line: &str, history: &mut HistoryStore, editor: &mut dyn LineEditor) {
    history.remove_matching(line);
    if let Err(e) = history.reload() {
        warn!(error = %e, "cannot reload history after correction");
        return;
    }
    if let Err(e) = editor.load_history(history.entries()) {
        warn!(error = %e, "cannot refresh editor history");
    }
}
