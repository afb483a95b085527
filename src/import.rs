//! Record import from JSON files
//!
//! Accepts either a JSON array of objects or newline-delimited JSON, one
//! object per line. Blank lines are skipped.

use std::path::Path;

use serde_json::Value;

use crate::record::AnimalRecord;
use crate::{Error, Result};

/// Load every record from a file
pub fn load_records(path: &Path) -> Result<Vec<AnimalRecord>> {
    let contents = std::fs::read_to_string(path)?;
    parse_records(&contents)
}

/// Parse records from JSON text
pub fn parse_records(contents: &str) -> Result<Vec<AnimalRecord>> {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('[') {
        let values: Vec<Value> = serde_json::from_str(trimmed)?;
        return values
            .into_iter()
            .enumerate()
            .map(|(i, value)| to_record(value, &format!("entry {}", i + 1)))
            .collect();
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value: Value = serde_json::from_str(line)?;
            to_record(value, &format!("line {}", i + 1))
        })
        .collect()
}

fn to_record(value: Value, position: &str) -> Result<AnimalRecord> {
    AnimalRecord::try_from(value).map_err(|e| match e {
        Error::InvalidInput(msg) => Error::InvalidInput(format!("{}: {}", position, msg)),
        other => other,
    })
}
