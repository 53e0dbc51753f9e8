// calc/mod.rs
//
// Calculator: a restricted expression evaluator plus a persisted history of
// successful evaluations.

pub mod allowlist;
pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod number;

use std::path::PathBuf;

pub use allowlist::AllowList;
pub use error::{CalculatorError, EvalError};
pub use eval::{evaluate, Evaluator};
pub use number::Number;

use crate::history::{History, HistoryEntry};

pub struct Calculator {
    evaluator: Evaluator<'static>,
    history: History,
}

impl Calculator {
    /// Opens a session over the history file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            evaluator: Evaluator::default(),
            history: History::open(path),
        }
    }

    /// Evaluates `expression` and records it. Failed evaluations leave the
    /// history untouched.
    pub fn evaluate(&mut self, expression: &str) -> Result<Number, CalculatorError> {
        let result = self.evaluator.evaluate(expression)?;
        log::debug!("{} = {}", expression, result);
        let stored = result.is_finite().then(|| result.clone());
        self.history.append(expression, stored)?;
        Ok(result)
    }

    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        self.history.recent(n)
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}
