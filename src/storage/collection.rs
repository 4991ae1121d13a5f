//! Generic whole-file JSON collection
//!
//! Every entity file has the shape `{ "next_id": n, "<name>": [ ... ] }`.
//! Mutations go through [`Collection::commit`], which edits a copy of the
//! collection, writes that copy to disk and only then publishes it in memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::error::{SpendwiseError, SpendwiseResult};

use super::file_io::{read_json, write_json_atomic};

/// A record stored in a collection, keyed by a sequential id
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: Copy + Ord + From<u64> + Into<u64> + std::fmt::Debug + std::fmt::Display;

    /// Key of the record array inside the collection file
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Check a record read from disk; a failure stops the whole file loading
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

/// In-memory contents of a collection
#[derive(Debug, Clone)]
pub struct CollectionState<T: Record> {
    next_id: u64,
    records: BTreeMap<T::Id, T>,
}

impl<T: Record> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            records: BTreeMap::new(),
        }
    }
}

impl<T: Record> CollectionState<T> {
    /// Hand out the next id. Ids are never reused, even after deletes.
    pub fn allocate_id(&mut self) -> T::Id {
        let id = self.next_id;
        self.next_id += 1;
        T::Id::from(id)
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.records.get_mut(&id)
    }

    /// Insert or replace a record
    pub fn insert(&mut self, record: T) {
        let id: u64 = record.id().into();
        if id >= self.next_id {
            self.next_id = id + 1;
        }
        self.records.insert(record.id(), record);
    }

    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        self.records.remove(&id)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.records.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.records.values_mut()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn to_json(&self) -> SpendwiseResult<Value> {
        let records: Vec<&T> = self.records.values().collect();
        let mut object = Map::new();
        object.insert("next_id".into(), Value::from(self.next_id));
        object.insert(T::COLLECTION.into(), serde_json::to_value(records)?);
        Ok(Value::Object(object))
    }

    fn from_json(value: Value, path: &Path) -> SpendwiseResult<Self> {
        let mut state = Self::default();

        let mut object = match value {
            Value::Null => return Ok(state),
            Value::Object(object) => object,
            // Bare arrays are accepted for files written by hand
            Value::Array(items) => {
                let mut object = Map::new();
                object.insert(T::COLLECTION.into(), Value::Array(items));
                object
            }
            _ => {
                return Err(SpendwiseError::Storage(format!(
                    "Unexpected JSON layout in {}",
                    path.display()
                )))
            }
        };

        let records: Vec<T> = match object.remove(T::COLLECTION) {
            Some(items) => serde_json::from_value(items).map_err(|e| {
                SpendwiseError::Storage(format!("Failed to parse {}: {}", path.display(), e))
            })?,
            None => Vec::new(),
        };

        for record in records {
            record.check().map_err(|e| {
                SpendwiseError::Storage(format!(
                    "Invalid record {} in {}: {}",
                    record.id(),
                    path.display(),
                    e
                ))
            })?;
            if state.records.contains_key(&record.id()) {
                return Err(SpendwiseError::Storage(format!(
                    "Duplicate id {} in {}",
                    record.id(),
                    path.display()
                )));
            }
            state.insert(record);
        }

        if let Some(next_id) = object.get("next_id").and_then(Value::as_u64) {
            state.next_id = state.next_id.max(next_id);
        }

        Ok(state)
    }
}

/// A collection persisted as one JSON file
pub struct Collection<T: Record> {
    path: PathBuf,
    state: RwLock<CollectionState<T>>,
}

impl<T: Record> Collection<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(CollectionState::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory state with the file contents
    pub fn load(&self) -> SpendwiseResult<()> {
        let value: Value = read_json(&self.path)?;
        let loaded = CollectionState::from_json(value, &self.path)?;

        let mut state = self
            .state
            .write()
            .map_err(|e| SpendwiseError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        tracing::debug!(
            collection = T::COLLECTION,
            records = loaded.len(),
            "collection loaded"
        );
        *state = loaded;
        Ok(())
    }

    /// Write the current in-memory state to disk
    pub fn save(&self) -> SpendwiseResult<()> {
        let state = self.read()?;
        write_json_atomic(&self.path, &state.to_json()?)
    }

    /// Run a read-only query against the collection
    pub fn query<R>(&self, f: impl FnOnce(&CollectionState<T>) -> R) -> SpendwiseResult<R> {
        let state = self.read()?;
        Ok(f(&state))
    }

    /// Apply a mutation and persist it as a single write
    ///
    /// The closure works on a copy. If it returns an error, or the file write
    /// fails, neither memory nor disk changes.
    pub fn commit<R>(
        &self,
        f: impl FnOnce(&mut CollectionState<T>) -> SpendwiseResult<R>,
    ) -> SpendwiseResult<R> {
        let mut state = self
            .state
            .write()
            .map_err(|e| SpendwiseError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        let mut draft = state.clone();
        let result = f(&mut draft)?;
        write_json_atomic(&self.path, &draft.to_json()?)?;
        *state = draft;
        Ok(result)
    }

    /// Snapshot of every record, in id order
    pub fn all(&self) -> SpendwiseResult<Vec<T>> {
        self.query(|state| state.values().cloned().collect())
    }

    pub fn get(&self, id: T::Id) -> SpendwiseResult<Option<T>> {
        self.query(|state| state.get(id).cloned())
    }

    pub fn count(&self) -> SpendwiseResult<usize> {
        self.query(|state| state.len())
    }

    fn read(&self) -> SpendwiseResult<std::sync::RwLockReadGuard<'_, CollectionState<T>>> {
        self.state
            .read()
            .map_err(|e| SpendwiseError::Storage(format!("Failed to acquire read lock: {}", e)))
    }
}
