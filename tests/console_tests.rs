//! Console sessions driven end to end against a real store

use docstore_console::build_descriptor;
use docstore_console::cli::{BatchDispatcher, HistoryStore, InteractiveSession, PipedEditor, workspace};
use docstore_console::DocumentDb;
use std::cell::RefCell;
use std::io::{self, Cursor, Write, sink};
use std::rc::Rc;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Console {
    store: TempDir,
    history_dir: TempDir,
    out: SharedBuf,
    diag: SharedBuf,
}

impl Console {
    fn new() -> Self {
        Self {
            store: TempDir::new().unwrap(),
            history_dir: TempDir::new().unwrap(),
            out: SharedBuf::default(),
            diag: SharedBuf::default(),
        }
    }

    fn history_path(&self) -> std::path::PathBuf {
        self.history_dir.path().join("history")
    }

    fn run(&self, input: &str) -> docstore_console::cli::SessionSummary {
        let workspace = workspace::resolve(self.store.path(), None).unwrap();
        let db = DocumentDb::open(&build_descriptor(&workspace)).unwrap();
        let history = HistoryStore::open(self.history_path()).unwrap();
        let editor = PipedEditor::new(Cursor::new(input.to_string()), Box::new(sink()));
        let dispatcher = BatchDispatcher::new(Box::new(self.out.clone()), Box::new(self.diag.clone()));

        let mut session = InteractiveSession::new(Box::new(db), history, Box::new(editor), dispatcher);
        session.run().unwrap()
    }
}

#[test]
fn test_rejected_statement_is_dropped_from_history() {
    let console = Console::new();
    console.run("CREATE TABLE x (a INTEGER)\n");
    let out_before = console.out.text();

    let summary = console.run("SELECT FROM x;garbage!!\n");
    assert_eq!(summary.statements, 2);
    assert_eq!(summary.rejected, 1);

    let new_output = &console.out.text()[out_before.len()..];
    assert_eq!(new_output, "[]\n");
    assert!(console.diag.text().contains("Rejected: "));

    let history = std::fs::read_to_string(console.history_path()).unwrap();
    assert_eq!(history, "1:CREATE TABLE x (a INTEGER)\n");
}

#[test]
fn test_results_and_history_across_sessions() {
    let console = Console::new();
    console.run(
        "CREATE TABLE Person (name TEXT, age INTEGER)\n\
         INSERT INTO Person (name, age) VALUES ('Alice', 30)\n\
         exit\n\
         SELECT FROM Person\n",
    );

    let summary = console.run("  \n;;;\nSELECT name FROM Person WHERE age = 30\n");
    assert_eq!(summary.lines, 2);
    assert_eq!(summary.statements, 1);
    assert!(console.out.text().ends_with("[\n  {\"name\":\"Alice\"}\n]\n"));

    let history = HistoryStore::open(console.history_path()).unwrap();
    let indices: Vec<u64> = history.entries().iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert_eq!(history.entries()[2].text, ";;;");
}

#[test]
fn test_failed_statement_keeps_history_and_batch_continues() {
    let console = Console::new();
    let summary = console.run("SELECT FROM Missing; CREATE TABLE Missing (a INTEGER); SELECT FROM Missing\n");

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.statements, 3);
    assert!(console.diag.text().contains("Error: Class 'Missing' not found"));
    // CREATE returns no documents, then the final SELECT
    assert_eq!(console.out.text(), "[]\n[]\n");

    let history = HistoryStore::open(console.history_path()).unwrap();
    assert_eq!(history.len(), 1);
}
