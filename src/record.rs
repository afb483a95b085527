//! Animal records - loosely-typed documents describing one shelter outcome
//!
//! A record is a JSON object. Only three fields carry meaning for filtering:
//! - `breed`: free text, matched by case-insensitive substring
//! - `sex_upon_outcome`: categorical text ("Intact Male", "Neutered Male", ...)
//! - `age_upon_outcome_in_weeks`: floating-point number

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field holding the breed description
pub const BREED: &str = "breed";
/// Field holding the categorical sex at outcome
pub const SEX_UPON_OUTCOME: &str = "sex_upon_outcome";
/// Field holding the age at outcome, in weeks
pub const AGE_UPON_OUTCOME_IN_WEEKS: &str = "age_upon_outcome_in_weeks";
/// Identity key assigned by the store. Never part of a record's own fields.
pub const IDENTITY_KEY: &str = "_id";

/// A partial field set, used for updates and equality clauses
pub type FieldMap = serde_json::Map<String, Value>;

/// Store-assigned identity of a persisted record
pub type RecordId = i64;

/// One shelter animal's intake/outcome document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimalRecord {
    fields: FieldMap,
}

impl AnimalRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Field names, sorted
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn breed(&self) -> Option<&str> {
        self.get(BREED).and_then(Value::as_str)
    }

    pub fn sex_upon_outcome(&self) -> Option<&str> {
        self.get(SEX_UPON_OUTCOME).and_then(Value::as_str)
    }

    /// Age in weeks. Only numeric values count; "52" as text is not an age.
    pub fn age_upon_outcome_in_weeks(&self) -> Option<f64> {
        self.get(AGE_UPON_OUTCOME_IN_WEEKS).and_then(Value::as_f64)
    }

    /// Merge `fields` over this record. Returns true if any value changed.
    pub fn merge(&mut self, fields: &FieldMap) -> bool {
        let mut changed = false;
        for (key, value) in fields {
            if self.fields.get(key) != Some(value) {
                self.fields.insert(key.clone(), value.clone());
                changed = true;
            }
        }
        changed
    }

    /// Drop the store identity key if a caller put one in the document
    pub(crate) fn strip_identity(&mut self) -> Option<Value> {
        self.fields.remove(IDENTITY_KEY)
    }
}

impl From<FieldMap> for AnimalRecord {
    fn from(fields: FieldMap) -> Self {
        Self { fields }
    }
}

impl TryFrom<Value> for AnimalRecord {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(crate::Error::InvalidInput(format!(
                "animal record must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse `field=value`. The value is read as JSON when it parses
/// (`age=52`, `adopted=true`), otherwise taken as plain text (`name=Rex`).
pub fn parse_assignment(input: &str) -> crate::Result<(String, Value)> {
    let (field, raw) = input.split_once('=').ok_or_else(|| {
        crate::Error::InvalidInput(format!("expected field=value, got {:?}", input))
    })?;
    let field = field.trim();
    if field.is_empty() {
        return Err(crate::Error::InvalidInput(format!("missing field name in {:?}", input)));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((field.to_string(), value))
}

/// A record together with its store identity.
///
/// Serializes flat, with the identity under `_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRecord {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(flatten)]
    pub record: AnimalRecord,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_accessors() {
        let record = AnimalRecord::new()
            .with(BREED, "Labrador Retriever Mix")
            .with(SEX_UPON_OUTCOME, "Intact Female")
            .with(AGE_UPON_OUTCOME_IN_WEEKS, 52.0);

        assert_eq!(record.breed(), Some("Labrador Retriever Mix"));
        assert_eq!(record.sex_upon_outcome(), Some("Intact Female"));
        assert_eq!(record.age_upon_outcome_in_weeks(), Some(52.0));
    }

    #[test]
    fn test_textual_age_is_not_numeric() {
        let record = AnimalRecord::new().with(AGE_UPON_OUTCOME_IN_WEEKS, "52");
        assert_eq!(record.age_upon_outcome_in_weeks(), None);
    }

    #[test]
    fn test_merge_reports_change() {
        let mut record = AnimalRecord::new().with("name", "Rex").with("color", "Black");

        let mut same = FieldMap::new();
        same.insert("name".into(), json!("Rex"));
        assert!(!record.merge(&same));

        let mut renamed = FieldMap::new();
        renamed.insert("name".into(), json!("Max"));
        renamed.insert("outcome_type".into(), json!("Adoption"));
        assert!(record.merge(&renamed));
        assert_eq!(record.get("name"), Some(&json!("Max")));
        assert_eq!(record.get("color"), Some(&json!("Black")));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_try_from_rejects_non_objects() {
        let err = AnimalRecord::try_from(json!([1, 2])).unwrap_err();
        assert!(err.is_invalid_input());

        let record = AnimalRecord::try_from(json!({"name": "Rex"})).unwrap();
        assert_eq!(record.get("name"), Some(&json!("Rex")));
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("name=Rex").unwrap(), ("name".to_string(), json!("Rex")));
        assert_eq!(parse_assignment("age=52.5").unwrap(), ("age".to_string(), json!(52.5)));
        assert_eq!(parse_assignment("ok=true").unwrap(), ("ok".to_string(), json!(true)));
        assert_eq!(
            parse_assignment("sex_upon_outcome=Intact Male").unwrap(),
            ("sex_upon_outcome".to_string(), json!("Intact Male"))
        );
        assert_eq!(parse_assignment("note=a=b").unwrap(), ("note".to_string(), json!("a=b")));
        assert!(parse_assignment("novalue").unwrap_err().is_invalid_input());
        assert!(parse_assignment("=x").unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_stored_record_serializes_flat() {
        let stored = StoredRecord {
            id: 7,
            record: AnimalRecord::new().with("name", "Rex"),
        };
        let value = serde_json::to_value(&stored).unwrap();
        assert_eq!(value, json!({"_id": 7, "name": "Rex"}));
    }
}
