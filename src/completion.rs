// completion.rs

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Completes the identifier under the cursor from a fixed word list.
/// An empty list turns completion off.
#[derive(Default)]
pub struct ToolkitHelper {
    words: Vec<String>,
}

impl ToolkitHelper {
    pub fn set_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words = words.into_iter().map(Into::into).collect();
        self.words.sort();
        self.words.dedup();
    }

    pub fn clear_words(&mut self) {
        self.words.clear();
    }

    fn candidates(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let head = &line[..pos];
        let start = head
            .char_indices()
            .rev()
            .take_while(|&(_, ch)| is_word_char(ch))
            .last()
            .map_or(pos, |(i, _)| i);
        let prefix = &head[start..];
        if prefix.is_empty() {
            return (start, Vec::new());
        }
        let pairs = self
            .words
            .iter()
            .filter(|w| w.starts_with(prefix))
            .map(|w| Pair {
                display: w.clone(),
                replacement: w.clone(),
            })
            .collect();
        (start, pairs)
    }
}

impl Completer for ToolkitHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        Ok(self.candidates(line, pos))
    }
}

impl Hinter for ToolkitHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ToolkitHelper {}

impl Validator for ToolkitHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> Result<ValidationResult, ReadlineError> {
        Ok(ValidationResult::Valid(None))
    }
}

impl Helper for ToolkitHelper {}
