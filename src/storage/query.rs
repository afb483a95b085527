//! Criteria compilation - turns `FilterCriteria` into a SQL predicate
//!
//! Documents live in a `doc` column as JSON text. Every clause reads its
//! field through `json_extract` / `json_type` with the JSON path bound as a
//! parameter, so field names never reach the SQL text.
//!
//! Breed matching goes through the `icontains` scalar function registered on
//! each connection, which shares its implementation with
//! `FilterCriteria::matches`.

use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::criteria::FilterCriteria;
use crate::record::{AGE_UPON_OUTCOME_IN_WEEKS, BREED, IDENTITY_KEY, SEX_UPON_OUTCOME};
use crate::{Error, Result};

/// Name of the case-insensitive substring function
pub const ICONTAINS: &str = "icontains";

/// A SQL predicate over the `doc` column plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub predicate: String,
    pub params: Vec<SqlValue>,
}

impl CompiledQuery {
    fn always() -> Self {
        Self {
            predicate: "1 = 1".to_string(),
            params: Vec::new(),
        }
    }
}

/// JSON path addressing a top-level field
pub fn field_path(field: &str) -> Result<String> {
    if field.is_empty() {
        return Err(Error::MalformedQuery("empty field name".to_string()));
    }
    if field == IDENTITY_KEY {
        return Err(Error::MalformedQuery(format!(
            "{} is the store identity and cannot be filtered on",
            IDENTITY_KEY
        )));
    }
    if field.contains('"') || field.contains('\\') {
        return Err(Error::MalformedQuery(format!(
            "unsupported character in field name: {:?}",
            field
        )));
    }
    Ok(format!("$.\"{}\"", field))
}

/// Compile criteria into a predicate. Empty criteria compile to a tautology.
pub fn compile(criteria: &FilterCriteria) -> Result<CompiledQuery> {
    if criteria.is_empty() {
        return Ok(CompiledQuery::always());
    }

    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if !criteria.breed_any.is_empty() {
        let path = field_path(BREED)?;
        params.push(SqlValue::Text(path.clone()));

        let mut alternatives = Vec::with_capacity(criteria.breed_any.len());
        for pattern in &criteria.breed_any {
            alternatives.push(format!("{}(json_extract(doc, ?), ?)", ICONTAINS));
            params.push(SqlValue::Text(path.clone()));
            params.push(SqlValue::Text(pattern.clone()));
        }
        clauses.push(format!(
            "(json_type(doc, ?) = 'text' AND ({}))",
            alternatives.join(" OR ")
        ));
    }

    if let Some(sex) = &criteria.sex_upon_outcome {
        clauses.push("json_extract(doc, ?) = ?".to_string());
        params.push(SqlValue::Text(field_path(SEX_UPON_OUTCOME)?));
        params.push(SqlValue::Text(sex.clone()));
    }

    if let Some(range) = &criteria.age_weeks {
        let path = field_path(AGE_UPON_OUTCOME_IN_WEEKS)?;
        clauses.push(
            "(json_type(doc, ?) IN ('integer', 'real') AND json_extract(doc, ?) BETWEEN ? AND ?)"
                .to_string(),
        );
        params.push(SqlValue::Text(path.clone()));
        params.push(SqlValue::Text(path));
        params.push(SqlValue::Real(range.min));
        params.push(SqlValue::Real(range.max));
    }

    for (field, expected) in &criteria.equals {
        let path = field_path(field)?;
        let (clause, mut values) = equality_clause(path, expected)?;
        clauses.push(clause);
        params.append(&mut values);
    }

    Ok(CompiledQuery {
        predicate: clauses.join(" AND "),
        params,
    })
}

fn equality_clause(path: String, expected: &Value) -> Result<(String, Vec<SqlValue>)> {
    let compiled = match expected {
        Value::Null => (
            "(json_type(doc, ?) IS NULL OR json_type(doc, ?) = 'null')".to_string(),
            vec![SqlValue::Text(path.clone()), SqlValue::Text(path)],
        ),
        Value::Bool(b) => (
            "json_type(doc, ?) = ?".to_string(),
            vec![
                SqlValue::Text(path),
                SqlValue::Text(if *b { "true" } else { "false" }.to_string()),
            ],
        ),
        Value::Number(n) => {
            let n = n.as_f64().ok_or_else(|| {
                Error::MalformedQuery(format!("number out of range: {}", n))
            })?;
            (
                "(json_type(doc, ?) IN ('integer', 'real') AND json_extract(doc, ?) = ?)".to_string(),
                vec![
                    SqlValue::Text(path.clone()),
                    SqlValue::Text(path),
                    SqlValue::Real(n),
                ],
            )
        }
        Value::String(s) => (
            "(json_type(doc, ?) = 'text' AND json_extract(doc, ?) = ?)".to_string(),
            vec![
                SqlValue::Text(path.clone()),
                SqlValue::Text(path),
                SqlValue::Text(s.clone()),
            ],
        ),
        Value::Array(_) | Value::Object(_) => {
            let kind = if expected.is_array() { "array" } else { "object" };
            (
                "(json_type(doc, ?) = ? AND json_extract(doc, ?) = ?)".to_string(),
                vec![
                    SqlValue::Text(path.clone()),
                    SqlValue::Text(kind.to_string()),
                    SqlValue::Text(path),
                    SqlValue::Text(serde_json::to_string(expected)?),
                ],
            )
        }
    };
    Ok(compiled)
}
