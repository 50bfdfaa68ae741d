use clap::Parser;
use docstore_console::cli::{
    Args, BatchDispatcher, HistoryStore, InteractiveSession, LineEditor, PipedEditor,
    RustylineEditor, workspace,
};
use docstore_console::cli::history::harvest_completion_words;
use docstore_console::{ConnectionDescriptor, ConsoleError, DocumentDb, build_descriptor};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let history_path = args.history_path();
    eprintln!("# history path: {}", history_path.display());

    let mut workspace = workspace::resolve(&args.path, args.extract_dir.as_deref())?;
    if workspace.is_archive() {
        eprintln!(
            "# unzip-ing {} to {}",
            workspace.source_path().display(),
            workspace.resolved_directory()
        );
    }

    let descriptor = build_descriptor(&workspace);
    eprintln!("# connection string = {}", descriptor.connection_string());

    let result = open_and_run(&descriptor, &history_path);
    workspace.release();
    result
}

fn open_and_run(descriptor: &ConnectionDescriptor, history_path: &Path) -> anyhow::Result<()> {
    let db = DocumentDb::open(descriptor).map_err(ConsoleError::Connection)?;
    let history = HistoryStore::open(history_path)?;

    let editor: Box<dyn LineEditor> = if io::stdin().is_terminal() {
        let words = harvest_completion_words(history_path);
        Box::new(RustylineEditor::new(words)?)
    } else {
        Box::new(PipedEditor::new(io::stdin().lock(), Box::new(io::stderr())))
    };

    let dispatcher = BatchDispatcher::new(Box::new(io::stdout()), Box::new(io::stderr()));
    let mut session = InteractiveSession::new(Box::new(db), history, editor, dispatcher);
    let summary = session.run()?;

    debug!(?summary, "console finished");
    Ok(())
}
