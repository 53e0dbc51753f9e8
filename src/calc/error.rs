// error.rs

use thiserror::Error;

use crate::store::StoreError;

/// Why an expression was refused or failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The expression names something outside the allow-list. Raised before
    /// any evaluation happens.
    #[error("name not allowed: {name}")]
    UnsafeName { name: String },

    /// Not a single well-formed arithmetic expression. `column` is 1-based.
    #[error("syntax error at column {column}: {message}")]
    Syntax { message: String, column: usize },

    /// Well-formed and allow-listed, but failed while computing.
    #[error("{0}")]
    Evaluation(String),
}

impl EvalError {
    pub(crate) fn syntax(message: impl Into<String>, offset: usize) -> Self {
        EvalError::Syntax {
            message: message.into(),
            column: offset + 1,
        }
    }

    pub(crate) fn evaluation(message: impl Into<String>) -> Self {
        EvalError::Evaluation(message.into())
    }

    pub(crate) fn overflow() -> Self {
        EvalError::evaluation("integer result too large")
    }

    pub(crate) fn int_too_large() -> Self {
        EvalError::evaluation("int too large to convert to float")
    }

    pub(crate) fn division_by_zero() -> Self {
        EvalError::evaluation("division by zero")
    }

    pub(crate) fn domain() -> Self {
        EvalError::evaluation("math domain error")
    }

    pub(crate) fn range() -> Self {
        EvalError::evaluation("math range error")
    }
}

/// Errors from [`super::Calculator::evaluate`]: the evaluator's failure
/// passed through unchanged, or the history file could not be written.
#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}
