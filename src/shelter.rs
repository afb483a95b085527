//! Animal shelter adapter - CRUD over one collection of animal records
//!
//! Input validation fails fast with `Error::InvalidInput` before the store is
//! touched. Store failures stop here: they are logged and turned into a
//! negative result (`false` or an empty list), so "store unavailable" and
//! "nothing matched" look the same to the caller and differ only in the logs.

use std::path::PathBuf;

use serde::Serialize;

use crate::criteria::FilterCriteria;
use crate::record::{AnimalRecord, FieldMap, IDENTITY_KEY, RecordId, StoredRecord};
use crate::rescue::{self, RescueCategory};
use crate::storage::{RecordStore, SqliteStore, StoreHandle, schema};
use crate::{Error, Result};

/// Counts recorded by the most recent update and delete
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounters {
    pub matched: usize,
    pub modified: usize,
    pub deleted: usize,
}

/// CRUD adapter over a lazily-opened record store
pub struct AnimalShelter<S: RecordStore + 'static = SqliteStore> {
    store: StoreHandle<S>,
    counters: OperationCounters,
}

impl AnimalShelter<SqliteStore> {
    /// Adapter over a SQLite file. Nothing is opened until the first operation.
    pub fn open(path: impl Into<PathBuf>, collection: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let collection = collection.into();
        schema::validate_collection(&collection)?;

        tracing::info!("Shelter store: {} (collection {})", path.display(), collection);
        Ok(Self::with_opener(move || SqliteStore::open(&path, &collection)))
    }

    /// Adapter over a fresh in-memory store
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_store(SqliteStore::open_in_memory()?))
    }
}

impl<S: RecordStore + 'static> AnimalShelter<S> {
    /// Adapter over an already-open store
    pub fn with_store(store: S) -> Self {
        Self {
            store: StoreHandle::ready(store),
            counters: OperationCounters::default(),
        }
    }

    /// Adapter that opens its store on first use
    pub fn with_opener(opener: impl Fn() -> Result<S> + Send + 'static) -> Self {
        Self {
            store: StoreHandle::lazy(opener),
            counters: OperationCounters::default(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_open()
    }

    /// Insert one record. Returns whether the store acknowledged the write.
    pub fn create(&self, record: &AnimalRecord) -> Result<bool> {
        if record.is_empty() {
            return Err(Error::InvalidInput("No document to save. Data is empty.".to_string()));
        }
        if record.contains(IDENTITY_KEY) {
            tracing::debug!("Ignoring caller-supplied {}; identity is store-assigned", IDENTITY_KEY);
        }
        tracing::debug!("Inserting document with {} fields", record.len());

        match self.store.get().and_then(|store| store.insert(record)) {
            Ok(outcome) => {
                tracing::info!("Inserted document with id: {}", outcome.id);
                Ok(outcome.acknowledged)
            }
            Err(e) => {
                tracing::error!(operation = "create", error = %e, "Error inserting document");
                Ok(false)
            }
        }
    }

    /// Records matching `criteria`, without their identity. Empty criteria
    /// return everything.
    pub fn read(&self, criteria: &FilterCriteria) -> Vec<AnimalRecord> {
        self.read_with_ids(criteria)
            .into_iter()
            .map(|stored| stored.record)
            .collect()
    }

    pub fn read_all(&self) -> Vec<AnimalRecord> {
        self.read(&FilterCriteria::new())
    }

    /// Resolve a rescue category and read its records
    pub fn read_category(&self, category: RescueCategory) -> Result<Vec<AnimalRecord>> {
        let criteria = rescue::resolve(category)?;
        Ok(self.read(&criteria))
    }

    /// Like `read`, but keeps each record's store identity
    pub fn read_with_ids(&self, criteria: &FilterCriteria) -> Vec<StoredRecord> {
        if criteria.is_empty() {
            tracing::debug!("Finding all documents");
        } else {
            tracing::debug!("Finding documents with criteria: {}", criteria);
        }

        match self.store.get().and_then(|store| store.find(criteria)) {
            Ok(records) => {
                tracing::info!("Found {} documents.", records.len());
                records
            }
            Err(e) => {
                tracing::error!(operation = "read", query = %criteria, error = %e, "Error retrieving documents");
                Vec::new()
            }
        }
    }

    pub fn read_by_id(&self, id: RecordId) -> Option<AnimalRecord> {
        match self.store.get().and_then(|store| store.get(id)) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(operation = "read_by_id", id, error = %e, "Error retrieving document by id");
                None
            }
        }
    }

    /// Merge `fields` into every record matching `query`.
    ///
    /// Returns true iff at least one record actually changed; a match whose
    /// fields already held the new values counts as matched, not modified.
    pub fn update(&mut self, query: &FilterCriteria, fields: &FieldMap) -> Result<bool> {
        if query.is_empty() {
            return Err(Error::InvalidInput("No search criteria is present.".to_string()));
        }
        if fields.is_empty() {
            return Err(Error::InvalidInput("No update value is present.".to_string()));
        }
        if fields.contains_key(IDENTITY_KEY) {
            return Err(Error::InvalidInput(format!("{} cannot be updated.", IDENTITY_KEY)));
        }

        match self.store.get().and_then(|store| store.update(query, fields)) {
            Ok(outcome) => {
                self.counters.matched = outcome.matched;
                self.counters.modified = outcome.modified;
                tracing::info!("Update: matched {}, modified {}", outcome.matched, outcome.modified);
                Ok(outcome.modified > 0)
            }
            Err(e) => {
                tracing::error!(operation = "update", query = %query, error = %e, "Error updating documents");
                Ok(false)
            }
        }
    }

    /// Remove every record matching `query`. True iff any were removed.
    pub fn delete(&mut self, query: &FilterCriteria) -> Result<bool> {
        if query.is_empty() {
            return Err(Error::InvalidInput("No search criteria is present.".to_string()));
        }

        match self.store.get().and_then(|store| store.delete(query)) {
            Ok(deleted) => {
                self.counters.deleted = deleted;
                tracing::info!("Deleted {} documents.", deleted);
                Ok(deleted > 0)
            }
            Err(e) => {
                tracing::error!(operation = "delete", query = %query, error = %e, "Error deleting documents");
                Ok(false)
            }
        }
    }

    /// Number of stored records; zero if the store cannot be reached
    pub fn count(&self) -> usize {
        match self.store.get().and_then(|store| store.count()) {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(operation = "count", error = %e, "Error counting documents");
                0
            }
        }
    }

    pub fn counters(&self) -> OperationCounters {
        self.counters
    }

    pub fn records_matched(&self) -> usize {
        self.counters.matched
    }

    pub fn records_updated(&self) -> usize {
        self.counters.modified
    }

    pub fn records_deleted(&self) -> usize {
        self.counters.deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AGE_UPON_OUTCOME_IN_WEEKS, BREED, SEX_UPON_OUTCOME};
    use crate::storage::{InsertOutcome, UpdateOutcome};
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that fails every call, as an unreachable server would
    struct UnreachableStore;

    impl RecordStore for UnreachableStore {
        fn insert(&self, _: &AnimalRecord) -> Result<InsertOutcome> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
        fn find(&self, _: &FilterCriteria) -> Result<Vec<StoredRecord>> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
        fn get(&self, _: RecordId) -> Result<Option<AnimalRecord>> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
        fn update(&self, _: &FilterCriteria, _: &FieldMap) -> Result<UpdateOutcome> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
        fn delete(&self, _: &FilterCriteria) -> Result<usize> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
        fn count(&self) -> Result<usize> {
            Err(Error::StoreUnavailable("connection refused".into()))
        }
    }

    fn dog(name: &str, breed: &str, sex: &str, weeks: f64) -> AnimalRecord {
        AnimalRecord::new()
            .with("name", name)
            .with(BREED, breed)
            .with(SEX_UPON_OUTCOME, sex)
            .with(AGE_UPON_OUTCOME_IN_WEEKS, weeks)
    }

    fn seeded() -> AnimalShelter {
        let shelter = AnimalShelter::in_memory().unwrap();
        for record in [
            dog("Luna", "Labrador Retriever Mix", "Intact Female", 52.0),
            dog("Bruno", "Labrador Retriever Mix", "Neutered Male", 52.0),
            dog("Koda", "Siberian Husky", "Intact Male", 200.0),
            dog("Tank", "ROTTWEILER MIX", "Intact Male", 200.0),
        ] {
            assert!(shelter.create(&record).unwrap());
        }
        shelter
    }

    fn fields(pairs: &[(&str, serde_json::Value)]) -> FieldMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn counting_shelter() -> (AnimalShelter, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = opened.clone();
        let shelter = AnimalShelter::with_opener(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            SqliteStore::open_in_memory()
        });
        (shelter, opened)
    }

    #[test]
    fn test_create_then_read_round_trip() {
        let shelter = AnimalShelter::in_memory().unwrap();
        let luna = dog("Luna", "Labrador Retriever Mix", "Intact Female", 52.0);
        assert!(shelter.create(&luna).unwrap());

        let found = shelter.read(&FilterCriteria::new().field_eq("name", "Luna").breed_any(["lab"]));
        assert_eq!(found, vec![luna]);
        assert!(!found[0].contains("_id"));
    }

    #[test]
    fn test_read_empty_criteria_returns_everything() {
        let shelter = seeded();
        assert_eq!(shelter.read(&FilterCriteria::new()).len(), 4);
        assert_eq!(shelter.read_all().len(), 4);
        assert_eq!(shelter.count(), 4);
    }

    #[test]
    fn test_read_category() {
        let shelter = seeded();

        let water = shelter.read_category(RescueCategory::Water).unwrap();
        assert_eq!(water.len(), 1);
        assert_eq!(water[0].get("name"), Some(&json!("Luna")));

        // Koda and Tank are both past the 156 week Mountain limit
        assert!(shelter.read_category(RescueCategory::Mountain).unwrap().is_empty());

        let disaster = shelter.read_category(RescueCategory::Disaster).unwrap();
        assert_eq!(disaster.len(), 1);
        assert_eq!(disaster[0].breed(), Some("ROTTWEILER MIX"));
    }

    #[test]
    fn test_read_category_mountain_matches_breed_substring() {
        let shelter = seeded();
        assert!(shelter.create(&dog("Rex", "Rottweiler", "Intact Male", 60.0)).unwrap());

        let mountain = shelter.read_category(RescueCategory::Mountain).unwrap();
        assert_eq!(mountain.len(), 1);
        assert_eq!(mountain[0].get("name"), Some(&json!("Rex")));

        let disaster = shelter.read_category(RescueCategory::Disaster).unwrap();
        assert_eq!(disaster.len(), 2);
    }

    #[test]
    fn test_create_identity_only_gets_store_assigned_id() {
        let shelter = AnimalShelter::in_memory().unwrap();
        assert!(shelter.create(&AnimalRecord::new().with("_id", 3)).unwrap());

        let stored = shelter.read_with_ids(&FilterCriteria::new());
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, 1);
        assert!(stored[0].record.is_empty());
    }

    #[test]
    fn test_read_no_match_is_empty() {
        let shelter = seeded();
        assert!(shelter.read(&FilterCriteria::new().field_eq("name", "Nobody")).is_empty());
    }

    #[test]
    fn test_read_with_ids_and_by_id() {
        let shelter = seeded();
        let stored = shelter.read_with_ids(&FilterCriteria::new().field_eq("name", "Koda"));
        assert_eq!(stored.len(), 1);

        let koda = shelter.read_by_id(stored[0].id).unwrap();
        assert_eq!(koda.breed(), Some("Siberian Husky"));
        assert!(shelter.read_by_id(9_999).is_none());
    }

    #[test]
    fn test_create_empty_fails_without_contacting_store() {
        let (shelter, opened) = counting_shelter();

        let err = shelter.create(&AnimalRecord::new()).unwrap_err();
        assert!(err.is_invalid_input());

        assert!(!shelter.is_connected());
        assert_eq!(opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_connection_opened_once() {
        let (shelter, opened) = counting_shelter();

        shelter.create(&dog("Luna", "Labrador", "Intact Female", 52.0)).unwrap();
        shelter.read_all();
        shelter.count();

        assert!(shelter.is_connected());
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_update_validation() {
        let mut shelter = seeded();
        let query = FilterCriteria::new().field_eq("name", "Luna");

        assert!(shelter.update(&query, &FieldMap::new()).unwrap_err().is_invalid_input());
        assert!(
            shelter
                .update(&FilterCriteria::new(), &fields(&[("outcome_type", json!("Adoption"))]))
                .unwrap_err()
                .is_invalid_input()
        );
        assert!(
            shelter
                .update(&query, &fields(&[("_id", json!(1))]))
                .unwrap_err()
                .is_invalid_input()
        );
    }

    #[test]
    fn test_update_counts() {
        let mut shelter = seeded();
        let labs = FilterCriteria::new().breed_any(["labrador"]);
        let adopted = fields(&[("outcome_type", json!("Adoption"))]);

        assert!(shelter.update(&labs, &adopted).unwrap());
        assert_eq!(shelter.records_matched(), 2);
        assert_eq!(shelter.records_updated(), 2);

        assert!(!shelter.update(&labs, &adopted).unwrap());
        assert_eq!(shelter.records_matched(), 2);
        assert_eq!(shelter.records_updated(), 0);

        let luna = shelter.read(&FilterCriteria::new().field_eq("name", "Luna"));
        assert_eq!(luna[0].get("outcome_type"), Some(&json!("Adoption")));
        assert_eq!(luna[0].sex_upon_outcome(), Some("Intact Female"));
    }

    #[test]
    fn test_delete() {
        let mut shelter = seeded();

        assert!(shelter.delete(&FilterCriteria::new()).unwrap_err().is_invalid_input());

        assert!(!shelter.delete(&FilterCriteria::new().field_eq("name", "Nobody")).unwrap());
        assert_eq!(shelter.records_deleted(), 0);
        assert_eq!(shelter.count(), 4);

        assert!(shelter.delete(&FilterCriteria::new().breed_any(["labrador"])).unwrap());
        assert_eq!(shelter.records_deleted(), 2);
        assert_eq!(shelter.count(), 2);
        assert_eq!(
            shelter.counters(),
            OperationCounters { matched: 0, modified: 0, deleted: 2 }
        );
    }

    #[test]
    fn test_store_failures_are_benign() {
        let mut shelter = AnimalShelter::with_store(UnreachableStore);
        let query = FilterCriteria::new().field_eq("name", "Luna");

        assert!(!shelter.create(&dog("Luna", "Labrador", "Intact Female", 52.0)).unwrap());
        assert!(shelter.read_all().is_empty());
        assert!(shelter.read_by_id(1).is_none());
        assert!(!shelter.update(&query, &fields(&[("name", json!("Max"))])).unwrap());
        assert!(!shelter.delete(&query).unwrap());
        assert_eq!(shelter.count(), 0);
        assert_eq!(shelter.counters(), OperationCounters::default());
    }

    #[test]
    fn test_unopenable_store_is_benign() {
        let shelter: AnimalShelter =
            AnimalShelter::with_opener(|| Err(Error::StoreUnavailable("no route to host".into())));

        assert!(shelter.read_all().is_empty());
        assert!(!shelter.create(&AnimalRecord::new().with("name", "Rex")).unwrap());
        assert!(!shelter.is_connected());
    }

    #[test]
    fn test_malformed_query_is_absorbed() {
        let mut shelter = seeded();
        let bad = FilterCriteria::new().field_eq("bad\"field", 1);

        assert!(shelter.read(&bad).is_empty());
        assert!(!shelter.delete(&bad).unwrap());
        assert_eq!(shelter.count(), 4);
    }

    #[test]
    fn test_open_validates_collection_eagerly() {
        let dir = tempfile::tempdir().unwrap();
        let err = AnimalShelter::open(dir.path().join("shelter.db"), "no spaces").err().unwrap();
        assert!(err.is_invalid_input());

        let shelter = AnimalShelter::open(dir.path().join("shelter.db"), "animals").unwrap();
        assert!(!shelter.is_connected());
        assert_eq!(shelter.count(), 0);
        assert!(shelter.is_connected());
    }
}
