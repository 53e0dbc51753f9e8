// tasks.rs

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::store::{JsonFile, StoreError};

pub const DEFAULT_PRIORITY: u8 = 3;

fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u32,
    pub title: String,
    /// 1 is the most urgent, 5 the least.
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// ISO date, compared as text.
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskOrder {
    #[default]
    Priority,
    Due,
    Id,
}

impl FromStr for TaskOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "priority" => Ok(TaskOrder::Priority),
            "due" => Ok(TaskOrder::Due),
            "id" => Ok(TaskOrder::Id),
            other => Err(format!("unknown order '{}' (priority, due, id)", other)),
        }
    }
}

/// Fields to overwrite; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub priority: Option<u8>,
    pub due: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub struct TaskManager {
    file: JsonFile<Vec<Task>>,
}

impl TaskManager {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::open(path),
        }
    }

    fn next_id(&self) -> u32 {
        self.file.data().iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    pub fn add(
        &mut self,
        title: impl Into<String>,
        priority: u8,
        due: Option<String>,
        tags: Vec<String>,
    ) -> Result<Task, StoreError> {
        let task = Task {
            id: self.next_id(),
            title: title.into(),
            priority: priority.clamp(1, 5),
            due,
            done: false,
            tags,
        };
        self.file.data_mut().push(task.clone());
        self.file.save()?;
        Ok(task)
    }

    /// Open tasks always sort ahead of finished ones.
    pub fn list(&self, show_done: bool, tag: Option<&str>, order: TaskOrder) -> Vec<&Task> {
        let visible = self
            .file
            .data()
            .iter()
            .filter(|t| show_done || !t.done)
            .filter(|t| tag.map_or(true, |tag| t.tags.iter().any(|x| x == tag)));
        match order {
            TaskOrder::Priority => visible
                .sorted_by_key(|t| (t.done, t.priority, t.due.clone().unwrap_or_default()))
                .collect(),
            TaskOrder::Due => visible
                .sorted_by_key(|t| {
                    let due = t.due.clone().unwrap_or_else(|| "9999-12-31".to_string());
                    (t.done, due, t.priority)
                })
                .collect(),
            TaskOrder::Id => visible.sorted_by_key(|t| (t.done, t.id)).collect(),
        }
    }

    pub fn toggle(&mut self, id: u32) -> Result<bool, StoreError> {
        let Some(task) = self.file.data_mut().iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.done = !task.done;
        self.file.save()?;
        Ok(true)
    }

    pub fn delete(&mut self, id: u32) -> Result<bool, StoreError> {
        let tasks = self.file.data_mut();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        self.file.save()?;
        Ok(true)
    }

    pub fn edit(&mut self, id: u32, edit: TaskEdit) -> Result<bool, StoreError> {
        let Some(task) = self.file.data_mut().iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if let Some(title) = edit.title {
            task.title = title;
        }
        if let Some(priority) = edit.priority {
            task.priority = priority.clamp(1, 5);
        }
        if let Some(due) = edit.due {
            task.due = Some(due);
        }
        if let Some(tags) = edit.tags {
            task.tags = tags;
        }
        self.file.save()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, TaskManager) {
        let dir = tempfile::tempdir().unwrap();
        let tm = TaskManager::open(dir.path().join("tasks.json"));
        (dir, tm)
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn crud_round_trip() {
        let (_dir, mut tm) = manager();
        let t = tm.add("Test", 2, None, vec![]).unwrap();
        assert_eq!(t.id, 1);
        assert_eq!(tm.list(true, None, TaskOrder::Priority).len(), 1);

        let edit = TaskEdit {
            title: Some("Updated".into()),
            priority: Some(5),
            ..TaskEdit::default()
        };
        assert!(tm.edit(1, edit).unwrap());
        assert_eq!(tm.list(true, None, TaskOrder::Priority)[0].title, "Updated");

        assert!(tm.toggle(1).unwrap());
        assert!(tm.list(true, None, TaskOrder::Priority)[0].done);

        assert!(tm.delete(1).unwrap());
        assert!(tm.list(true, None, TaskOrder::Priority).is_empty());
    }

    #[test]
    fn filters_and_orders() {
        let (_dir, mut tm) = manager();
        tm.add("A", 5, Some("2099-01-10".into()), vec!["x".into()]).unwrap();
        tm.add("B", 1, Some("2099-01-01".into()), vec!["y".into()]).unwrap();
        tm.add("C", 3, None, vec![]).unwrap();

        tm.toggle(3).unwrap();
        assert!(!titles(&tm.list(false, None, TaskOrder::Priority)).contains(&"C".to_string()));
        assert_eq!(titles(&tm.list(true, None, TaskOrder::Due))[..2], ["B", "A"]);
        assert_eq!(titles(&tm.list(true, None, TaskOrder::Priority)), ["B", "A", "C"]);
        assert_eq!(titles(&tm.list(true, Some("y"), TaskOrder::Id)), ["B"]);
    }

    #[test]
    fn priority_is_clamped_and_ids_grow() {
        let (_dir, mut tm) = manager();
        assert_eq!(tm.add("hi", 0, None, vec![]).unwrap().priority, 1);
        assert_eq!(tm.add("lo", 9, None, vec![]).unwrap().priority, 5);
        tm.delete(1).unwrap();
        assert_eq!(tm.add("next", 3, None, vec![]).unwrap().id, 3);
    }

    #[test]
    fn missing_ids_report_false() {
        let (_dir, mut tm) = manager();
        assert!(!tm.toggle(999).unwrap());
        assert!(!tm.delete(999).unwrap());
        assert!(!tm.edit(999, TaskEdit::default()).unwrap());
    }

    #[test]
    fn order_parses_from_text() {
        assert_eq!("".parse::<TaskOrder>().unwrap(), TaskOrder::Priority);
        assert_eq!("DUE".parse::<TaskOrder>().unwrap(), TaskOrder::Due);
        assert!("size".parse::<TaskOrder>().is_err());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        std::fs::write(&path, "{broken").unwrap();
        assert!(TaskManager::open(&path).list(true, None, TaskOrder::Id).is_empty());
    }
}
