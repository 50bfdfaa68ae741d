use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::collections::BTreeSet;

/// Tab completion over a fixed vocabulary: the seed keywords plus words
/// harvested from the history file at startup.
pub struct WordCompleter {
    words: BTreeSet<String>,
}

impl WordCompleter {
    pub fn new(words: BTreeSet<String>) -> Self {
        Self { words }
    }

    /// Start of the word under the cursor and every vocabulary entry it
    /// prefixes, ignoring case.
    pub fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<String>) {
        let head = &line[..pos];
        let start = head
            .rfind(|c: char| c.is_whitespace() || c == ',' || c == '(')
            .map(|i| i + 1)
            .unwrap_or(0);

        let prefix = head[start..].to_lowercase();
        if prefix.is_empty() {
            return (start, Vec::new());
        }

        let matches = self
            .words
            .iter()
            .filter(|word| word.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        (start, matches)
    }
}

impl Completer for WordCompleter {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = self.candidates(line, pos);
        let pairs = matches
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for WordCompleter {
    type Hint = String;
}

impl Highlighter for WordCompleter {}

impl Validator for WordCompleter {}

impl Helper for WordCompleter {}
