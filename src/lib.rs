//! # Shelterdash - animal shelter records with rescue-category filters
//!
//! Shelterdash provides:
//! - A fixed table of rescue categories (water, mountain, disaster) and the
//!   resolver that turns a category into structured filter criteria
//! - A SQLite-backed document store holding one JSON document per animal
//! - `AnimalShelter`, a CRUD adapter over one lazily-opened store connection
//! - Tabular record views, JSON import and a small JSON API

pub mod record;
pub mod criteria;
pub mod rescue;
pub mod storage;
pub mod shelter;
pub mod view;
pub mod import;
pub mod config;
pub mod server;
pub mod ui;

// Re-exports for convenient access
pub use record::{AnimalRecord, FieldMap, RecordId, StoredRecord};
pub use criteria::{AgeRange, FilterCriteria};
pub use rescue::{RescueCategory, resolve, resolve_named};
pub use shelter::{AnimalShelter, OperationCounters};
pub use storage::{RecordStore, SqliteStore};

/// Result type alias for Shelterdash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Shelterdash operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is a caller mistake rather than a store failure
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput(_))
    }
}
