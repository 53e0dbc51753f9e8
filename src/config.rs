// config.rs

use anyhow::Context;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";

/// Where each utility keeps its files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the data directory if needed.
    pub fn ensure(&self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("cannot create data directory {}", self.root.display()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tasks(&self) -> PathBuf {
        self.root.join("tasks.json")
    }

    pub fn notes(&self) -> PathBuf {
        self.root.join("notes.json")
    }

    pub fn habits(&self) -> PathBuf {
        self.root.join("habits.json")
    }

    pub fn calc_history(&self) -> PathBuf {
        self.root.join("calc_history.json")
    }

    pub fn address_book(&self) -> PathBuf {
        self.root.join("addressbook.sqlite3")
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_under_root() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path().join("nested"));
        paths.ensure().unwrap();
        assert!(paths.root().is_dir());
        assert_eq!(paths.calc_history(), dir.path().join("nested/calc_history.json"));
        assert_eq!(paths.address_book().file_name().unwrap(), "addressbook.sqlite3");
    }
}
