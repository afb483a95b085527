//! Database schema definitions
//!
//! Every collection is one table of JSON documents keyed by an integer
//! identity. Table names come from configuration, so statements are built
//! per collection rather than held as constants.

use crate::{Error, Result};

/// Default collection holding animal records
pub const DEFAULT_COLLECTION: &str = "animals";

/// Validate a collection name for use as a table identifier
pub fn validate_collection(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::InvalidInput(format!(
            "Collection name must be an identifier: {:?}",
            name
        )));
    }
    if name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(Error::InvalidInput(format!(
            "Collection name is reserved: {:?}",
            name
        )));
    }
    Ok(())
}

/// SQL to create a collection table
pub fn create_collection_table(collection: &str) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS "{collection}" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    doc TEXT NOT NULL CHECK (json_valid(doc) AND json_type(doc) = 'object')
)
"#
    )
}

/// All schema creation statements for a collection
pub fn all_schema_statements(collection: &str) -> Vec<String> {
    vec![create_collection_table(collection)]
}
