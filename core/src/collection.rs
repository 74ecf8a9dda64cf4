use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::record::Record;

type ChangeListener = Arc<dyn Fn() + Send + Sync + 'static>;

/// The live record container an operation applies loaded/saved data to.
/// Order-preserving, indexed by record id where records carry one.
///
/// All mutation goes through a write guard; a single change notification is
/// sent when the guard drops (if anything changed). Exactly one operation
/// at a time is expected to apply results here - overlapping callers are
/// the embedding application's problem to serialize.
#[derive(Clone)]
pub struct Collection(Arc<Inner>);

struct Inner {
    state: Mutex<State>,
    listeners: Mutex<HashMap<usize, ChangeListener>>,
    next_listener: AtomicUsize,
}

struct State {
    order: Vec<Record>,
    index: HashMap<String, usize>,
}

/// A write guard for atomic changes. Holds the state lock; sends one
/// notification on drop when changes were made.
pub struct CollectionWrite<'a> {
    collection: &'a Collection,
    changed: bool,
    guard: Option<MutexGuard<'a, State>>,
}

/// A read guard for consistent read-only access.
pub struct CollectionRead<'a> {
    guard: MutexGuard<'a, State>,
}

/// Unsubscribes its change listener when dropped.
pub struct ChangeGuard {
    inner: Weak<Inner>,
    id: usize,
}

impl Default for Collection {
    fn default() -> Self { Self::new() }
}

impl Collection {
    pub fn new() -> Self {
        Self(Arc::new(Inner {
            state: Mutex::new(State { order: Vec::new(), index: HashMap::new() }),
            listeners: Mutex::new(HashMap::new()),
            next_listener: AtomicUsize::new(0),
        }))
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        let collection = Self::new();
        collection.write().replace_all(records);
        collection
    }

    pub fn write(&self) -> CollectionWrite<'_> {
        let guard = self.0.state.lock().unwrap();
        CollectionWrite { collection: self, changed: false, guard: Some(guard) }
    }

    pub fn read(&self) -> CollectionRead<'_> { CollectionRead { guard: self.0.state.lock().unwrap() } }

    pub fn len(&self) -> usize { self.0.state.lock().unwrap().order.len() }

    pub fn is_empty(&self) -> bool { self.0.state.lock().unwrap().order.is_empty() }

    pub fn by_id(&self, id: &str) -> Option<Record> {
        let state = self.0.state.lock().unwrap();
        state.index.get(id).map(|&i| state.order[i].clone())
    }

    /// Snapshot of the current records in order.
    pub fn records(&self) -> Vec<Record> { self.0.state.lock().unwrap().order.clone() }

    pub fn subscribe<F>(&self, listener: F) -> ChangeGuard
    where F: Fn() + Send + Sync + 'static {
        let id = self.0.next_listener.fetch_add(1, Ordering::Relaxed);
        self.0.listeners.lock().unwrap().insert(id, Arc::new(listener));
        ChangeGuard { inner: Arc::downgrade(&self.0), id }
    }

    fn notify(&self) {
        // Clone the listeners out of the lock before calling
        let listeners = self.0.listeners.lock().unwrap().values().cloned().collect::<Vec<_>>();
        for listener in listeners {
            listener();
        }
    }
}

impl<'a> CollectionWrite<'a> {
    /// Insert or replace by record id. Records without an id append.
    pub fn upsert(&mut self, record: Record) {
        let state = self.guard.as_mut().expect("write guard already dropped");
        match record.id_string() {
            Some(id) => match state.index.get(&id) {
                Some(&i) => state.order[i] = record,
                None => {
                    let next = state.order.len();
                    state.index.insert(id, next);
                    state.order.push(record);
                }
            },
            None => state.order.push(record),
        }
        self.changed = true;
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let state = self.guard.as_mut().expect("write guard already dropped");
        if let Some(removed) = state.index.remove(id) {
            state.order.remove(removed);
            reindex_from(state, removed);
            self.changed = true;
            true
        } else {
            false
        }
    }

    pub fn replace_all(&mut self, records: Vec<Record>) {
        let state = self.guard.as_mut().expect("write guard already dropped");
        state.order.clear();
        state.index.clear();
        for record in records {
            if let Some(id) = record.id_string() {
                let next = state.order.len();
                state.index.insert(id, next);
            }
            state.order.push(record);
        }
        self.changed = true;
    }

    pub fn extend(&mut self, records: Vec<Record>) {
        for record in records {
            self.upsert(record);
        }
    }

    pub fn len(&self) -> usize { self.guard.as_ref().expect("write guard already dropped").order.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl<'a> Drop for CollectionWrite<'a> {
    fn drop(&mut self) {
        if self.changed {
            // Release the lock before notifying
            drop(self.guard.take());
            self.collection.notify();
        }
    }
}

impl<'a> CollectionRead<'a> {
    pub fn len(&self) -> usize { self.guard.order.len() }

    pub fn is_empty(&self) -> bool { self.guard.order.is_empty() }

    pub fn get(&self, index: usize) -> Option<&Record> { self.guard.order.get(index) }

    pub fn by_id(&self, id: &str) -> Option<&Record> { self.guard.index.get(id).map(|&i| &self.guard.order[i]) }

    pub fn iter(&self) -> impl Iterator<Item = &Record> { self.guard.order.iter() }
}

impl Drop for ChangeGuard {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.lock().unwrap().remove(&self.id);
        }
    }
}

fn reindex_from(state: &mut State, start: usize) {
    // Recompute indices for the shifted tail
    for i in start..state.order.len() {
        if let Some(id) = state.order[i].id_string() {
            state.index.insert(id, i);
        }
    }
}
