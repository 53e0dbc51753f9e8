// store.rs
//
// Shared persistence for the JSON-backed managers (tasks, notes, habits,
// calculator history). A file that is missing or cannot be parsed loads as
// the empty default; saving rewrites the whole file.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads `path` as JSON, falling back to `T::default()` on any failure.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} does not exist yet, starting empty", path.display());
            return T::default();
        }
        Err(err) => {
            log::warn!("cannot read {}, starting empty: {}", path.display(), err);
            return T::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("{} is corrupt, starting empty: {}", path.display(), err);
            T::default()
        }
    }
}

/// Writes `value` as indented JSON, replacing the file.
pub fn save_pretty<T>(path: &Path, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("saved {}", path.display());
    Ok(())
}

/// A value bound to the JSON file it was loaded from.
#[derive(Debug)]
pub struct JsonFile<T> {
    path: PathBuf,
    data: T,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load_or_default(&path);
        Self { path, data }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Mutations made through this reference stay in memory until
    /// [`JsonFile::save`] runs, even if that save fails.
    pub fn data_mut(&mut self) -> &mut T {
        &mut self.data
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save_pretty(&self.path, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn missing_file_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let file: JsonFile<Vec<String>> = JsonFile::open(dir.path().join("absent.json"));
        assert!(file.data().is_empty());
    }

    #[test]
    fn corrupt_or_wrong_shape_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        for content in ["{broken", "", "{\"a\": 1}", "[1, 2, 3]"] {
            fs::write(&path, content).unwrap();
            let file: JsonFile<Vec<String>> = JsonFile::open(&path);
            assert!(file.data().is_empty(), "{content:?}");
        }
    }

    #[test]
    fn save_writes_indented_json_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let mut file: JsonFile<BTreeMap<String, u32>> = JsonFile::open(&path);
        file.data_mut().insert("a".into(), 1);
        file.save().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
        let reopened: JsonFile<BTreeMap<String, u32>> = JsonFile::open(&path);
        assert_eq!(reopened.data().get("a"), Some(&1));
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("data.json");
        let mut file: JsonFile<Vec<u8>> = JsonFile::open(&path);
        file.data_mut().push(1);
        assert!(matches!(file.save(), Err(StoreError::Write { .. })));
        assert_eq!(file.data(), &vec![1]);
    }
}
