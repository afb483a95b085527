//! Storage Layer - SQLite-backed document persistence
//!
//! One table per collection, one JSON document per row:
//! - <collection>(id, doc)
//!
//! `RecordStore` is the seam the shelter adapter talks to; `SqliteStore` is
//! the implementation, `StoreHandle` the lazily-opened connection.

pub mod handle;
pub mod query;
pub mod schema;
pub mod sqlite;

pub use handle::StoreHandle;
pub use sqlite::SqliteStore;

use crate::Result;
use crate::criteria::FilterCriteria;
use crate::record::{AnimalRecord, FieldMap, RecordId, StoredRecord};

/// Result of a single-document insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub id: RecordId,
    pub acknowledged: bool,
}

/// Result of a bulk update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: usize,
    pub modified: usize,
}

/// A single collection of animal documents
pub trait RecordStore {
    fn insert(&self, record: &AnimalRecord) -> Result<InsertOutcome>;

    /// Matching documents in insertion order
    fn find(&self, criteria: &FilterCriteria) -> Result<Vec<StoredRecord>>;

    fn get(&self, id: RecordId) -> Result<Option<AnimalRecord>>;

    /// Merge `fields` into every match; unchanged matches are not modified
    fn update(&self, criteria: &FilterCriteria, fields: &FieldMap) -> Result<UpdateOutcome>;

    fn delete(&self, criteria: &FilterCriteria) -> Result<usize>;

    fn count(&self) -> Result<usize>;
}
