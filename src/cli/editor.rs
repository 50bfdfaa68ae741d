//! Line input for the console
//!
//! [`RustylineEditor`] drives an interactive terminal with recall and tab
//! completion. [`PipedEditor`] reads plain lines from any reader, which is
//! what scripts piping statements into the console get.

use super::autocomplete::WordCompleter;
use super::history::HistoryEntry;
use crate::core::{ConsoleError, ConsoleResult};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config, EditMode, Editor};
use std::collections::BTreeSet;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl+C: the pending line is dropped.
    Interrupted,
    /// Ctrl+D or the input stream ended.
    EndOfInput,
}

pub trait LineEditor {
    fn read_line(&mut self, prompt: &str) -> ConsoleResult<ReadOutcome>;

    /// Replace the recall list with `entries`.
    fn load_history(&mut self, entries: &[HistoryEntry]) -> ConsoleResult<()>;

    fn add_history(&mut self, text: &str);
}

pub struct RustylineEditor {
    editor: Editor<WordCompleter, DefaultHistory>,
}

impl RustylineEditor {
    pub fn new(completion_words: BTreeSet<String>) -> ConsoleResult<Self> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .auto_add_history(false)
            .build();

        let mut editor = Editor::<WordCompleter, DefaultHistory>::with_config(config)
            .map_err(|e| ConsoleError::Editor(e.to_string()))?;
        editor.set_helper(Some(WordCompleter::new(completion_words)));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> ConsoleResult<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::EndOfInput),
            Err(e) => Err(ConsoleError::Editor(e.to_string())),
        }
    }

    fn load_history(&mut self, entries: &[HistoryEntry]) -> ConsoleResult<()> {
        self.editor
            .clear_history()
            .map_err(|e| ConsoleError::Editor(e.to_string()))?;
        for entry in entries {
            self.add_history(&entry.text);
        }
        Ok(())
    }

    fn add_history(&mut self, text: &str) {
        let _ = self.editor.add_history_entry(text);
    }
}

/// Reads lines from `input`, writing the prompt to `prompt_out`.
///
/// There is no recall list; history calls only keep the entries around so
/// tests can inspect them.
pub struct PipedEditor<R: BufRead> {
    input: R,
    prompt_out: Box<dyn Write>,
    recall: Vec<String>,
}

impl<R: BufRead> PipedEditor<R> {
    pub fn new(input: R, prompt_out: Box<dyn Write>) -> Self {
        Self {
            input,
            prompt_out,
            recall: Vec::new(),
        }
    }

    pub fn recall(&self) -> &[String] {
        &self.recall
    }
}

impl<R: BufRead> LineEditor for PipedEditor<R> {
    fn read_line(&mut self, prompt: &str) -> ConsoleResult<ReadOutcome> {
        write!(self.prompt_out, "{}", prompt)?;
        self.prompt_out.flush()?;

        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(ReadOutcome::EndOfInput);
        }
        // Invalid UTF-8 is replaced rather than ending the session
        let line = String::from_utf8_lossy(&raw);
        Ok(ReadOutcome::Line(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    fn load_history(&mut self, entries: &[HistoryEntry]) -> ConsoleResult<()> {
        self.recall = entries.iter().map(|e| e.text.clone()).collect();
        Ok(())
    }

    fn add_history(&mut self, text: &str) {
        self.recall.push(text.to_string());
    }
}
