use std::cell::RefCell;
use std::collections::HashMap;

use futures::future::LocalBoxFuture;
use gloo::storage::{LocalStorage, Storage, errors::StorageError};

use crate::domain::{
    benchmark::{BenchmarkResult, KeyValueStorage, ReferenceStore},
    errors::{BenchError, BenchResult},
    logging::{LogComponent, get_logger, get_time_provider},
    reference::{ReferenceIndexEntry, ReferenceName, ReferenceSnapshot, sort_index, upsert_index},
};

/// `window.localStorage`. Values are stored JSON-encoded, as gloo does.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageBackend;

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self
    }
}

impl KeyValueStorage for LocalStorageBackend {
    fn get(&self, key: &str) -> BenchResult<Option<String>> {
        match LocalStorage::get::<String>(key) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::KeyNotFound(_)) => Ok(None),
            Err(err) => Err(BenchError::Storage(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> BenchResult<()> {
        LocalStorage::set(key, value).map_err(|e| BenchError::Storage(e.to_string()))
    }

    fn remove(&self, key: &str) -> BenchResult<()> {
        LocalStorage::delete(key);
        Ok(())
    }
}

/// Process-local storage for tests and hosts without `localStorage`
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> BenchResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> BenchResult<()> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> BenchResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// References kept in browser storage: one index record plus one body
/// record per name, all under `<namespace>.references.`.
pub struct BrowserReferenceStore<S: KeyValueStorage> {
    storage: S,
    namespace: String,
}

impl<S: KeyValueStorage> BrowserReferenceStore<S> {
    pub fn new(storage: S, namespace: impl Into<String>) -> Self {
        Self { storage, namespace: namespace.into() }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn index_key(&self) -> String {
        format!("{}.references.index", self.namespace)
    }

    pub fn body_key(&self, name: &ReferenceName) -> String {
        format!("{}.references.body.{}", self.namespace, name)
    }

    fn read_index(&self) -> BenchResult<Vec<ReferenceIndexEntry>> {
        match self.storage.get(&self.index_key())? {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_index(&self, index: &[ReferenceIndexEntry]) -> BenchResult<()> {
        self.storage.set(&self.index_key(), &serde_json::to_string(index)?)
    }

    fn lookup(name: &str) -> BenchResult<ReferenceName> {
        ReferenceName::sanitize(name).map_err(|_| BenchError::NotFound(name.to_string()))
    }
}

impl<S: KeyValueStorage> ReferenceStore for BrowserReferenceStore<S> {
    fn list(&self) -> LocalBoxFuture<'_, BenchResult<Vec<ReferenceIndexEntry>>> {
        Box::pin(async move {
            let mut index = self.read_index()?;
            sort_index(&mut index);
            Ok(index)
        })
    }

    fn save<'a>(
        &'a self,
        name: &'a str,
        results: &'a [BenchmarkResult],
    ) -> LocalBoxFuture<'a, BenchResult<ReferenceName>> {
        Box::pin(async move {
            let snapshot = ReferenceSnapshot {
                name: ReferenceName::sanitize(name)?,
                created_at: get_time_provider().current_timestamp(),
                entries: results.to_vec(),
            };

            // Body first: an index entry never points at a missing body.
            self.storage.set(&self.body_key(&snapshot.name), &serde_json::to_string(&snapshot)?)?;
            let mut index = self.read_index()?;
            upsert_index(&mut index, snapshot.index_entry());
            self.write_index(&index)?;

            crate::log_debug!(
                LogComponent::Infrastructure("BrowserReferences"),
                "Saved {} ({} results)",
                snapshot.name,
                snapshot.entries.len()
            );
            Ok(snapshot.name)
        })
    }

    fn load<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, BenchResult<Vec<BenchmarkResult>>> {
        Box::pin(async move {
            let key = self.body_key(&Self::lookup(name)?);
            let text = self
                .storage
                .get(&key)?
                .ok_or_else(|| BenchError::NotFound(name.to_string()))?;
            let snapshot: ReferenceSnapshot = serde_json::from_str(&text)?;
            Ok(snapshot.entries)
        })
    }

    fn delete<'a>(&'a self, name: &'a str) -> LocalBoxFuture<'a, BenchResult<()>> {
        Box::pin(async move {
            let Ok(name) = ReferenceName::sanitize(name) else {
                return Ok(());
            };
            let mut index = self.read_index()?;
            let before = index.len();
            index.retain(|entry| entry.name != name);
            if index.len() != before {
                self.write_index(&index)?;
            }
            self.storage.remove(&self.body_key(&name))?;
            let message = format!("Deleted {name}");
            get_logger().debug(LogComponent::Infrastructure("BrowserReferences"), &message);
            Ok(())
        })
    }
}
