//! SQLite storage implementation

use std::path::Path;

use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::query::{self, ICONTAINS};
use super::schema;
use super::{InsertOutcome, RecordStore, UpdateOutcome};
use crate::criteria::{FilterCriteria, contains_ignore_case};
use crate::record::{AnimalRecord, FieldMap, RecordId, StoredRecord};
use crate::Result;

/// SQLite-backed document store for one collection of animal records
pub struct SqliteStore {
    conn: Connection,
    collection: String,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path, collection: &str) -> Result<Self> {
        schema::validate_collection(collection)?;
        let conn = Connection::open(path)?;
        Self::initialize(conn, collection)
    }

    /// Open an in-memory database with the default collection (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::open_in_memory_with(schema::DEFAULT_COLLECTION)
    }

    /// Open an in-memory database with a named collection
    pub fn open_in_memory_with(collection: &str) -> Result<Self> {
        schema::validate_collection(collection)?;
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn, collection)
    }

    fn initialize(conn: Connection, collection: &str) -> Result<Self> {
        register_functions(&conn)?;
        for stmt in schema::all_schema_statements(collection) {
            conn.execute(&stmt, [])?;
        }
        Ok(Self {
            conn,
            collection: collection.to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    // ========== Document Operations ==========

    /// Insert one document, returning its assigned id
    pub fn insert_document(&self, record: &AnimalRecord) -> Result<InsertOutcome> {
        let mut record = record.clone();
        record.strip_identity();
        let doc = serde_json::to_string(&record)?;

        let inserted = self.conn.execute(
            &format!(r#"INSERT INTO "{}" (doc) VALUES (?1)"#, self.collection),
            params![doc],
        )?;

        Ok(InsertOutcome {
            id: self.conn.last_insert_rowid(),
            acknowledged: inserted == 1,
        })
    }

    /// Get a document by id
    pub fn get_document(&self, id: RecordId) -> Result<Option<AnimalRecord>> {
        self.conn
            .query_row(
                &format!(r#"SELECT id, doc FROM "{}" WHERE id = ?1"#, self.collection),
                [id],
                row_to_stored,
            )
            .optional()
            .map(|stored| stored.map(|s| s.record))
            .map_err(Into::into)
    }

    /// Find documents matching criteria, in insertion order
    pub fn find_documents(&self, criteria: &FilterCriteria) -> Result<Vec<StoredRecord>> {
        let compiled = query::compile(criteria)?;
        let mut stmt = self.conn.prepare(&format!(
            r#"SELECT id, doc FROM "{}" WHERE {} ORDER BY id"#,
            self.collection, compiled.predicate
        ))?;

        let records = stmt
            .query_map(params_from_iter(compiled.params.iter()), row_to_stored)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    /// Merge `fields` into every matching document
    pub fn update_documents(&self, criteria: &FilterCriteria, fields: &FieldMap) -> Result<UpdateOutcome> {
        let tx = self.conn.unchecked_transaction()?;
        let matched = self.find_documents(criteria)?;

        let mut modified = 0;
        {
            let mut stmt = tx.prepare(&format!(
                r#"UPDATE "{}" SET doc = ?1 WHERE id = ?2"#,
                self.collection
            ))?;
            for stored in &matched {
                let mut record = stored.record.clone();
                if record.merge(fields) {
                    stmt.execute(params![serde_json::to_string(&record)?, stored.id])?;
                    modified += 1;
                }
            }
        }
        tx.commit()?;

        Ok(UpdateOutcome {
            matched: matched.len(),
            modified,
        })
    }

    /// Delete every matching document, returning how many were removed
    pub fn delete_documents(&self, criteria: &FilterCriteria) -> Result<usize> {
        let compiled = query::compile(criteria)?;
        let deleted = self.conn.execute(
            &format!(
                r#"DELETE FROM "{}" WHERE {}"#,
                self.collection, compiled.predicate
            ),
            params_from_iter(compiled.params.iter()),
        )?;
        Ok(deleted)
    }

    /// Count all documents
    pub fn count_documents(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            &format!(r#"SELECT COUNT(*) FROM "{}""#, self.collection),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl RecordStore for SqliteStore {
    fn insert(&self, record: &AnimalRecord) -> Result<InsertOutcome> {
        self.insert_document(record)
    }

    fn find(&self, criteria: &FilterCriteria) -> Result<Vec<StoredRecord>> {
        self.find_documents(criteria)
    }

    fn get(&self, id: RecordId) -> Result<Option<AnimalRecord>> {
        self.get_document(id)
    }

    fn update(&self, criteria: &FilterCriteria, fields: &FieldMap) -> Result<UpdateOutcome> {
        self.update_documents(criteria, fields)
    }

    fn delete(&self, criteria: &FilterCriteria) -> Result<usize> {
        self.delete_documents(criteria)
    }

    fn count(&self) -> Result<usize> {
        self.count_documents()
    }
}

/// Register `icontains(text, needle)`. Non-text arguments never match.
fn register_functions(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        ICONTAINS,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = match ctx.get_raw(0) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok(),
                _ => None,
            };
            let needle = match ctx.get_raw(1) {
                ValueRef::Text(bytes) => std::str::from_utf8(bytes).ok(),
                _ => None,
            };
            Ok(match (haystack, needle) {
                (Some(haystack), Some(needle)) => contains_ignore_case(haystack, needle),
                _ => false,
            })
        },
    )?;
    Ok(())
}

/// Helper to convert a row to a StoredRecord
fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredRecord> {
    let id: RecordId = row.get(0)?;
    let doc: String = row.get(1)?;

    let fields: FieldMap = serde_json::from_str(&doc).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredRecord {
        id,
        record: AnimalRecord::from(fields),
    })
}
