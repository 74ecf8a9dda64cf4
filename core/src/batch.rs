use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::DataError;
use crate::eventual::{Eventual, EventualState};
use crate::id::BatchId;
use crate::operation::Operation;
use crate::resultset::ResultSet;

/// Aggregates independent operations (e.g. saving several related entity
/// groups at once) into one combined future: resolves with per-operation
/// results in input order once all operations resolve, rejects on the first
/// operation rejection, aborts pending children on [`Batch::abort`]. Child
/// progress passes through.
#[derive(Clone)]
pub struct Batch(Arc<Inner>);

struct Inner {
    id: BatchId,
    operations: Vec<Operation>,
    eventual: Eventual<Vec<ResultSet>, DataError>,
    started: AtomicBool,
}

impl Batch {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self(Arc::new(Inner { id: BatchId::new(), operations, eventual: Eventual::new(), started: AtomicBool::new(false) }))
    }

    pub fn id(&self) -> BatchId { self.0.id }

    pub fn operations(&self) -> &[Operation] { &self.0.operations }

    pub fn eventual(&self) -> &Eventual<Vec<ResultSet>, DataError> { &self.0.eventual }

    pub fn state(&self) -> EventualState { self.0.eventual.state() }

    /// Subscribe to the children, then run them in input order. Idempotent.
    pub fn run(&self) -> &Self {
        if self.0.started.swap(true, Ordering::SeqCst) {
            return self;
        }
        info!(batch = %self.id(), operations = self.0.operations.len(), "run");

        let futures: Vec<_> = self.0.operations.iter().map(|operation| operation.eventual().clone()).collect();
        let joined = Eventual::join(&futures);

        let me = self.clone();
        joined.on_success(move |sets| {
            if me.0.eventual.state().is_terminal() {
                warn!(batch = %me.id(), "discarding late results");
                return;
            }
            info!(batch = %me.id(), operations = sets.len(), "resolved");
            me.0.eventual.resolve(sets.clone());
        });
        let me = self.clone();
        joined.on_failure(move |error| {
            warn!(batch = %me.id(), %error, "operation failed");
            me.0.eventual.reject(error.clone());
        });
        let me = self.clone();
        joined.on_abort(move || me.0.eventual.abort());
        let me = self.clone();
        joined.on_progress(move |progress| me.0.eventual.notify(progress));

        for operation in &self.0.operations {
            operation.run();
        }
        self
    }

    /// Abort every still-pending child operation, then the batch itself.
    /// Idempotent.
    pub fn abort(&self) {
        info!(batch = %self.id(), "abort");
        for operation in &self.0.operations {
            if operation.state() == EventualState::Pending {
                operation.abort();
            }
        }
        self.0.eventual.abort();
    }
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch").field("id", &self.0.id).field("operations", &self.0.operations.len()).field("state", &self.state()).finish()
    }
}
