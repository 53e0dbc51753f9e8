// habits.rs

use chrono::Local;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::store::{JsonFile, StoreError};

/// ISO date to whether the habit was kept that day.
pub type Records = BTreeMap<String, bool>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    pub name: String,
    pub records: Records,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyStats {
    pub done: usize,
    pub total: usize,
    pub percent: f64,
}

/// Persisted as `{ "<habit>": { "<date>": true|false } }`.
pub struct HabitTracker {
    file: JsonFile<BTreeMap<String, Records>>,
}

impl HabitTracker {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            file: JsonFile::open(path),
        }
    }

    pub fn add(&mut self, name: &str) -> Result<(), StoreError> {
        self.file.data_mut().entry(name.to_string()).or_default();
        self.file.save()
    }

    /// Records `value` for `date` (today when `None`), creating the habit
    /// if it does not exist yet.
    pub fn mark(&mut self, name: &str, date: Option<&str>, value: bool) -> Result<(), StoreError> {
        let date = date.map(str::to_string).unwrap_or_else(today);
        self.file
            .data_mut()
            .entry(name.to_string())
            .or_default()
            .insert(date, value);
        self.file.save()
    }

    /// All habits sorted by name.
    pub fn list(&self) -> Vec<Habit> {
        self.file
            .data()
            .iter()
            .map(|(name, records)| Habit {
                name: name.clone(),
                records: records.clone(),
            })
            .collect()
    }

    pub fn monthly_stats(&self, name: &str, year: i32, month: u32) -> MonthlyStats {
        let Some(records) = self.file.data().get(name) else {
            return MonthlyStats { done: 0, total: 0, percent: 0.0 };
        };
        let prefix = format!("{:04}-{:02}-", year, month);
        let days: Vec<bool> = records
            .iter()
            .filter(|(date, _)| date.starts_with(&prefix))
            .map(|(_, &kept)| kept)
            .collect();
        let done = days.iter().filter(|&&kept| kept).count();
        let total = days.len();
        let percent = if total == 0 {
            0.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        MonthlyStats { done, total, percent }
    }
}

/// Today's ISO date in local time.
pub fn today() -> String {
    Local::now().date_naive().to_string()
}
