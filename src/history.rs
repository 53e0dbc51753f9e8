// history.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calc::Number;
use crate::store::{JsonFile, StoreError};

/// One evaluated expression. Stored on disk as `[expression, result]`;
/// a result that is not a finite number is stored as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Option<Number>)", into = "(String, Option<Number>)")]
pub struct HistoryEntry {
    pub expression: String,
    pub result: Option<Number>,
}

impl From<(String, Option<Number>)> for HistoryEntry {
    fn from((expression, result): (String, Option<Number>)) -> Self {
        Self { expression, result }
    }
}

impl From<HistoryEntry> for (String, Option<Number>) {
    fn from(entry: HistoryEntry) -> Self {
        (entry.expression, entry.result)
    }
}

/// Append-only log of evaluations bound to one file.
pub struct History {
    file: JsonFile<Vec<HistoryEntry>>,
}

impl History {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let file: JsonFile<Vec<HistoryEntry>> = JsonFile::open(path);
        log::debug!(
            "loaded {} history entries from {}",
            file.data().len(),
            file.path().display()
        );
        Self { file }
    }

    /// Records an entry and rewrites the file. On a write error the entry
    /// remains in memory but is not on disk.
    pub fn append(
        &mut self,
        expression: impl Into<String>,
        result: Option<Number>,
    ) -> Result<(), StoreError> {
        self.file.data_mut().push(HistoryEntry {
            expression: expression.into(),
            result,
        });
        self.file.save()
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let entries = self.file.data();
        &entries[entries.len().saturating_sub(n)..]
    }

    pub fn all(&self) -> &[HistoryEntry] {
        self.file.data()
    }

    pub fn len(&self) -> usize {
        self.file.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.data().is_empty()
    }
}
