//! Filter criteria - the structured query consumed by the record store
//!
//! A criteria object is an AND over up to four clause kinds:
//! - breed: OR over case-insensitive, unanchored substrings
//! - sex: exact equality on `sex_upon_outcome`
//! - age: inclusive numeric range on `age_upon_outcome_in_weeks`
//! - equals: exact equality on arbitrary fields
//!
//! An empty criteria object matches every record.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{AGE_UPON_OUTCOME_IN_WEEKS, AnimalRecord, BREED, FieldMap, SEX_UPON_OUTCOME};

/// Unanchored substring search that ignores letter case.
///
/// Shared by in-process evaluation and the SQL `icontains` function so both
/// paths agree on what "matches" means.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Inclusive numeric range, in weeks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: f64,
    pub max: f64,
}

impl AgeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, weeks: f64) -> bool {
        weeks >= self.min && weeks <= self.max
    }
}

/// Structured query over animal records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Breed substrings; a record matches if its breed contains any of them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breed_any: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex_upon_outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_weeks: Option<AgeRange>,
    /// Exact field equalities. A `null` value also matches a missing field.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub equals: FieldMap,
}

impl FilterCriteria {
    /// Criteria with no clauses (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breed_any<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breed_any = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn sex(mut self, sex: impl Into<String>) -> Self {
        self.sex_upon_outcome = Some(sex.into());
        self
    }

    pub fn age_weeks(mut self, min: f64, max: f64) -> Self {
        self.age_weeks = Some(AgeRange::new(min, max));
        self
    }

    pub fn field_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.breed_any.is_empty()
            && self.sex_upon_outcome.is_none()
            && self.age_weeks.is_none()
            && self.equals.is_empty()
    }

    /// Evaluate against a single record, with the store's semantics.
    pub fn matches(&self, record: &AnimalRecord) -> bool {
        if !self.breed_any.is_empty() {
            let Some(breed) = record.breed() else {
                return false;
            };
            if !self
                .breed_any
                .iter()
                .any(|pattern| contains_ignore_case(breed, pattern))
            {
                return false;
            }
        }

        if let Some(sex) = &self.sex_upon_outcome {
            if record.sex_upon_outcome() != Some(sex.as_str()) {
                return false;
            }
        }

        if let Some(range) = &self.age_weeks {
            match record.age_upon_outcome_in_weeks() {
                Some(age) if range.contains(age) => {}
                _ => return false,
            }
        }

        self.equals
            .iter()
            .all(|(field, expected)| value_equals(record.get(field), expected))
    }
}

/// Equality as the store evaluates it: numbers compare by value
/// (52 == 52.0), `null` also matches absence.
fn value_equals(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (None, Value::Null) => true,
        (None, _) => false,
        (Some(Value::Number(a)), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Some(a), b) => a == b,
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<all>");
        }

        let mut clauses = Vec::new();
        if !self.breed_any.is_empty() {
            clauses.push(format!("{}~[{}]", BREED, self.breed_any.join("|")));
        }
        if let Some(sex) = &self.sex_upon_outcome {
            clauses.push(format!("{}={:?}", SEX_UPON_OUTCOME, sex));
        }
        if let Some(range) = &self.age_weeks {
            clauses.push(format!(
                "{} in [{}, {}]",
                AGE_UPON_OUTCOME_IN_WEEKS, range.min, range.max
            ));
        }
        for (field, value) in &self.equals {
            clauses.push(format!("{}={}", field, value));
        }
        write!(f, "{}", clauses.join(" AND "))
    }
}
