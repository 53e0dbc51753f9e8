// convert.rs

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::csv::{format_record, parse_records};

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON must contain a list of objects")]
    NotAList,

    #[error("item {index} is not an object")]
    NotAnObject { index: usize },
}

/// Rows and columns written.
pub type Shape = (usize, usize);

fn read(path: &Path) -> Result<String, ConvertError> {
    fs::read_to_string(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), ConvertError> {
    fs::write(path, contents).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Strings are written as-is and null or missing as empty. Numbers, bools,
/// arrays and nested objects are written as their JSON text.
fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Header is the sorted union of every object's keys.
pub fn json_to_csv(json_path: &Path, csv_path: &Path) -> Result<Shape, ConvertError> {
    let data: Value = serde_json::from_str(&read(json_path)?)?;
    let Value::Array(items) = data else {
        return Err(ConvertError::NotAList);
    };
    let objects = items
        .iter()
        .enumerate()
        .map(|(index, item)| item.as_object().ok_or(ConvertError::NotAnObject { index }))
        .collect::<Result<Vec<&Map<String, Value>>, _>>()?;
    let keys: BTreeSet<&str> = objects
        .iter()
        .flat_map(|o| o.keys().map(String::as_str))
        .collect();
    let keys: Vec<&str> = keys.into_iter().collect();

    let mut out = format_record(&keys);
    for object in &objects {
        let row: Vec<String> = keys.iter().map(|k| cell(object.get(*k))).collect();
        out.push_str(&format_record(&row));
    }
    write(csv_path, &out)?;
    log::debug!("wrote {} rows to {}", objects.len(), csv_path.display());
    Ok((objects.len(), keys.len()))
}

/// Values stay strings; short rows fill with `null`, blank lines are skipped.
/// Cells past the header's width are dropped with a warning.
pub fn csv_to_json(csv_path: &Path, json_path: &Path) -> Result<Shape, ConvertError> {
    let mut records = parse_records(&read(csv_path)?)
        .into_iter()
        .filter(|r| !(r.len() == 1 && r[0].is_empty()));
    let header = records.next().unwrap_or_default();
    let rows: Vec<Value> = records
        .enumerate()
        .map(|(index, record)| {
            if record.len() > header.len() {
                log::warn!(
                    "{}: data row {} has {} cells but the header has {}, dropping the rest",
                    csv_path.display(),
                    index + 1,
                    record.len(),
                    header.len()
                );
            }
            let object: Map<String, Value> = header
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let value = record.get(i).cloned().map_or(Value::Null, Value::String);
                    (key.clone(), value)
                })
                .collect();
            Value::Object(object)
        })
        .collect();
    write(json_path, &serde_json::to_string_pretty(&rows)?)?;
    log::debug!("wrote {} objects to {}", rows.len(), json_path.display());
    Ok((rows.len(), header.len()))
}
