use super::dispatcher::{BatchDispatcher, QueryEngine};
use super::editor::{LineEditor, ReadOutcome};
use super::history::HistoryStore;
use crate::core::ConsoleResult;
use std::io::Write;
use tracing::{debug, warn};

pub const PROMPT: &str = "=> ";
pub const BANNER: &str = "# Type 'exit' or Ctrl+D to exit. Ctrl+C to cancel current query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Executing,
    /// Ctrl+C dropped the pending line; the next read follows.
    Interrupted,
    Closed,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub lines: usize,
    pub statements: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Read loop of the console. Owns the store connection, the history and the
/// line editor for the duration of a run.
pub struct InteractiveSession {
    engine: Box<dyn QueryEngine>,
    history: HistoryStore,
    editor: Box<dyn LineEditor>,
    dispatcher: BatchDispatcher,
    state: SessionState,
}

impl InteractiveSession {
    pub fn new(
        engine: Box<dyn QueryEngine>,
        history: HistoryStore,
        editor: Box<dyn LineEditor>,
        dispatcher: BatchDispatcher,
    ) -> Self {
        Self {
            engine,
            history,
            editor,
            dispatcher,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Read and execute lines until `exit` or end of input.
    pub fn run(&mut self) -> ConsoleResult<SessionSummary> {
        let mut summary = SessionSummary::default();

        writeln!(self.dispatcher.diag(), "{}", BANNER)?;
        self.editor.load_history(self.history.entries())?;

        while self.state != SessionState::Closed {
            self.state = SessionState::AwaitingInput;

            match self.editor.read_line(PROMPT)? {
                ReadOutcome::Line(line) => {
                    let trimmed = line.trim();
                    if trimmed.eq_ignore_ascii_case("exit") {
                        self.state = SessionState::Closed;
                        continue;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }

                    summary.lines += 1;
                    if let Err(e) = self.history.append(&line) {
                        warn!(error = %e, "statement not recorded in history");
                    }
                    self.editor.add_history(&line);

                    self.state = SessionState::Executing;
                    let report = self.dispatcher.execute(
                        &line,
                        self.engine.as_mut(),
                        &mut self.history,
                        self.editor.as_mut(),
                    )?;
                    summary.statements += report.statements;
                    summary.rejected += report.rejected;
                    summary.failed += report.failed;
                }
                ReadOutcome::Interrupted => {
                    writeln!(self.dispatcher.diag(), "^C")?;
                    self.state = SessionState::Interrupted;
                }
                ReadOutcome::EndOfInput => {
                    writeln!(self.dispatcher.diag(), "^D")?;
                    self.state = SessionState::Closed;
                }
            }
        }

        debug!(?summary, "session closed");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::dispatcher::QueryOutcome;
    use crate::cli::history::HistoryEntry;
    use crate::core::{DbError, Document};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::io::{self, sink};
    use std::rc::Rc;
    use tempfile::TempDir;

    struct ScriptedEditor {
        script: VecDeque<ReadOutcome>,
    }

    impl ScriptedEditor {
        fn new(script: Vec<ReadOutcome>) -> Self {
            Self { script: script.into() }
        }
    }

    impl LineEditor for ScriptedEditor {
        fn read_line(&mut self, _prompt: &str) -> ConsoleResult<ReadOutcome> {
            Ok(self.script.pop_front().unwrap_or(ReadOutcome::EndOfInput))
        }

        fn load_history(&mut self, _entries: &[HistoryEntry]) -> ConsoleResult<()> {
            Ok(())
        }

        fn add_history(&mut self, _text: &str) {}
    }

    #[derive(Clone, Default)]
    struct CountingEngine(Rc<RefCell<Vec<String>>>);

    impl QueryEngine for CountingEngine {
        fn run(&mut self, statement: &str) -> QueryOutcome {
            self.0.borrow_mut().push(statement.to_string());
            if statement.starts_with("nonsense") {
                QueryOutcome::Rejected(DbError::ExecutorNotFound("NONSENSE".into()))
            } else {
                QueryOutcome::Documents(vec![Document::new()])
            }
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn line(text: &str) -> ReadOutcome {
        ReadOutcome::Line(text.to_string())
    }

    fn session(temp_dir: &TempDir, script: Vec<ReadOutcome>, engine: CountingEngine, diag: SharedBuf) -> InteractiveSession {
        let history = HistoryStore::open(temp_dir.path().join("history")).unwrap();
        let dispatcher = BatchDispatcher::new(Box::new(sink()), Box::new(diag));
        InteractiveSession::new(
            Box::new(engine),
            history,
            Box::new(ScriptedEditor::new(script)),
            dispatcher,
        )
    }

    #[test]
    fn test_interrupts_do_not_close() {
        let temp_dir = TempDir::new().unwrap();
        let engine = CountingEngine::default();
        let diag = SharedBuf::default();
        let script = vec![
            ReadOutcome::Interrupted,
            ReadOutcome::Interrupted,
            line("SELECT FROM a"),
            ReadOutcome::Interrupted,
            line("SELECT FROM b"),
        ];

        let mut session = session(&temp_dir, script, engine.clone(), diag.clone());
        let summary = session.run().unwrap();

        assert_eq!(summary.lines, 2);
        assert_eq!(engine.0.borrow().len(), 2);
        assert_eq!(session.state(), SessionState::Closed);

        let diag = String::from_utf8(diag.0.borrow().clone()).unwrap();
        assert!(diag.starts_with(BANNER));
        assert_eq!(diag.matches("^C\n").count(), 3);
        assert!(diag.ends_with("^D\n"));
    }

    #[test]
    fn test_exit_closes_and_skips_the_rest() {
        let temp_dir = TempDir::new().unwrap();
        let engine = CountingEngine::default();
        let script = vec![line("SELECT FROM a"), line("  EXIT "), line("SELECT FROM b")];

        let mut session = session(&temp_dir, script, engine.clone(), SharedBuf::default());
        session.run().unwrap();

        assert_eq!(engine.0.borrow().to_vec(), vec!["SELECT FROM a".to_string()]);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_rejected_lines_leave_history() {
        let temp_dir = TempDir::new().unwrap();
        let engine = CountingEngine::default();
        let script = vec![line("SELECT FROM a"), line("nonsense here"), line(""), line("SELECT FROM b")];

        let mut session = session(&temp_dir, script, engine.clone(), SharedBuf::default());
        let summary = session.run().unwrap();

        assert_eq!(summary.lines, 3);
        assert_eq!(summary.rejected, 1);
        let texts: Vec<&str> = session.history().entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["SELECT FROM a", "SELECT FROM b"]);
        let indices: Vec<u64> = session.history().entries().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![1, 2]);
    }
}
