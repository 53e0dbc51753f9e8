// notes.rs

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::{JsonFile, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Local time, `YYYY-MM-DDTHH:MM:SS`.
    pub created_at: String,
}

pub struct NotesManager {
    file: JsonFile<Vec<Note>>,
}

impl NotesManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::open(path),
        }
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        body: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Note, StoreError> {
        let id = self.file.data().iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let note = Note {
            id,
            title: title.into(),
            body: body.into(),
            tags,
            created_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        };
        self.file.data_mut().push(note.clone());
        self.file.save()?;
        Ok(note)
    }

    /// Newest first; notes created in the same second keep insertion order.
    pub fn list(&self, tag: Option<&str>) -> Vec<&Note> {
        let mut notes: Vec<&Note> = self
            .file
            .data()
            .iter()
            .filter(|n| tag.map_or(true, |tag| n.tags.iter().any(|t| t == tag)))
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes
    }

    pub fn delete(&mut self, id: u32) -> Result<bool, StoreError> {
        let notes = self.file.data_mut();
        let before = notes.len();
        notes.retain(|n| n.id != id);
        if notes.len() == before {
            return Ok(false);
        }
        self.file.save()?;
        Ok(true)
    }

    /// Case-insensitive substring match over title, body and tags.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let query = query.to_lowercase();
        self.file
            .data()
            .iter()
            .filter(|n| {
                n.title.to_lowercase().contains(&query)
                    || n.body.to_lowercase().contains(&query)
                    || n.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }
}
