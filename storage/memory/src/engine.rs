use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use datalith_core::CollectionId;
use serde_json::Value;

/// In-process storage: named collections of id-keyed JSON values. Values
/// are stored in key order, so scans are deterministic.
#[derive(Clone, Default)]
pub struct MemoryEngine {
    collections: Arc<Mutex<HashMap<CollectionId, MemoryCollection>>>,
}

impl MemoryEngine {
    pub fn new() -> Self { Self::default() }

    /// Opens and/or creates a collection.
    pub fn collection(&self, id: &CollectionId) -> MemoryCollection {
        let mut collections = self.collections.lock().unwrap();
        collections.entry(id.clone()).or_default().clone()
    }

    pub fn collection_ids(&self) -> Vec<CollectionId> { self.collections.lock().unwrap().keys().cloned().collect() }
}

#[derive(Clone, Default)]
pub struct MemoryCollection(Arc<Mutex<BTreeMap<String, Value>>>);

impl MemoryCollection {
    pub fn set(&self, id: impl Into<String>, value: Value) { self.0.lock().unwrap().insert(id.into(), value); }

    pub fn get(&self, id: &str) -> Option<Value> { self.0.lock().unwrap().get(id).cloned() }

    pub fn remove(&self, id: &str) -> Option<Value> { self.0.lock().unwrap().remove(id) }

    pub fn contains(&self, id: &str) -> bool { self.0.lock().unwrap().contains_key(id) }

    pub fn len(&self) -> usize { self.0.lock().unwrap().len() }

    pub fn is_empty(&self) -> bool { self.0.lock().unwrap().is_empty() }

    /// Values in key order, windowed by offset/limit. Returns the slice and
    /// the un-windowed total.
    pub fn scan(&self, offset: u64, limit: Option<u64>) -> (Vec<Value>, u64) {
        let store = self.0.lock().unwrap();
        let total = store.len() as u64;
        let values = match limit {
            Some(limit) => store.values().skip(offset as usize).take(limit as usize).cloned().collect(),
            None => store.values().skip(offset as usize).cloned().collect(),
        };
        (values, total)
    }
}
