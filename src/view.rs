//! Tabular view over a list of records
//!
//! Records are loosely typed, so columns are the union of every field seen,
//! in first-seen order. Missing cells render empty.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use crate::record::AnimalRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordView {
    pub columns: Vec<String>,
    pub data: Vec<AnimalRecord>,
}

impl RecordView {
    pub fn from_records(data: Vec<AnimalRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for record in &data {
            for key in record.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Keep only the first `limit` rows; columns are left as computed
    pub fn truncate(&mut self, limit: usize) {
        self.data.truncate(limit);
    }

    /// Rows of display strings, aligned with `columns`
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.data
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|column| cell_text(record.get(column)))
                    .collect()
            })
            .collect()
    }
}

/// Display text for one cell
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
