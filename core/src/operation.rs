use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collection::Collection;
use crate::error::DataError;
use crate::eventual::{Eventual, EventualState};
use crate::id::OperationId;
use crate::proxy::Proxy;
use crate::record::Record;
use crate::request::{Action, Request};
use crate::resultset::ResultSet;

/// One caller-visible CRUD call, composed of one or more child requests
/// (e.g. one per page of a ranged load).
///
/// The operation's own future is a pure function of the children's:
/// it resolves with the children's result sets concatenated in
/// **issue order** (never completion order) once the last child resolves,
/// rejects as soon as any child rejects, and aborts when the owner calls
/// [`Operation::abort`]. Results arriving after the operation is terminal
/// are discarded - recorded on the child request, never applied to the
/// target collection.
#[derive(Clone)]
pub struct Operation(Arc<Inner>);

struct Inner {
    id: OperationId,
    action: Action,
    requests: Vec<Arc<Request>>,
    proxy: Arc<dyn Proxy>,
    target: Option<Collection>,
    eventual: Eventual<ResultSet, DataError>,
    started: AtomicBool,
}

impl Operation {
    pub fn new(action: Action, requests: Vec<Arc<Request>>, proxy: Arc<dyn Proxy>, target: Option<Collection>) -> Self {
        Self(Arc::new(Inner { id: OperationId::new(), action, requests, proxy, target, eventual: Eventual::new(), started: AtomicBool::new(false) }))
    }

    pub fn id(&self) -> OperationId { self.0.id }

    pub fn action(&self) -> Action { self.0.action }

    pub fn requests(&self) -> &[Arc<Request>] { &self.0.requests }

    pub fn eventual(&self) -> &Eventual<ResultSet, DataError> { &self.0.eventual }

    pub fn state(&self) -> EventualState { self.0.eventual.state() }

    /// Subscribe to the children, then dispatch them to the proxy in issue
    /// order. Subscribing first means synchronously-settling proxies take
    /// the same path as deferred ones. Idempotent.
    pub fn run(&self) -> &Self {
        if self.0.started.swap(true, Ordering::SeqCst) {
            return self;
        }
        info!(operation = %self.id(), action = %self.action(), requests = self.0.requests.len(), "run");

        let futures: Vec<_> = self.0.requests.iter().map(|request| request.eventual().clone()).collect();
        let joined = Eventual::join(&futures);

        let me = self.clone();
        joined.on_success(move |sets| me.complete(sets));
        let me = self.clone();
        joined.on_failure(move |error| {
            warn!(operation = %me.id(), %error, "request failed");
            me.0.eventual.reject(error.clone());
        });
        let me = self.clone();
        joined.on_abort(move || me.0.eventual.abort());
        let me = self.clone();
        joined.on_progress(move |progress| me.0.eventual.notify(progress));

        for request in &self.0.requests {
            debug!(operation = %self.id(), request = %request.id(), "dispatch");
            self.0.proxy.perform(request.clone());
        }
        self
    }

    /// All children resolved: aggregate in issue order, apply to the target,
    /// settle. Owners must check their own terminal state before applying
    /// child results anywhere - late data after abort is dropped here.
    fn complete(&self, sets: &[ResultSet]) {
        if self.0.eventual.state().is_terminal() {
            warn!(operation = %self.id(), "discarding late results");
            return;
        }
        let aggregate = merge(sets);
        if let Some(target) = &self.0.target {
            self.apply(target, &aggregate);
        }
        info!(operation = %self.id(), action = %self.action(), records = aggregate.len(), "resolved");
        self.0.eventual.resolve(aggregate);
    }

    fn apply(&self, target: &Collection, results: &ResultSet) {
        let mut write = target.write();
        match self.0.action {
            Action::Read => write.replace_all(results.records().to_vec()),
            Action::Create | Action::Update => write.extend(results.records().to_vec()),
            Action::Destroy => {
                // The children echo back what they destroyed; fall back to
                // the request payload for backends that return nothing.
                let mut destroyed: Vec<&Record> = results.records().iter().collect();
                if destroyed.is_empty() {
                    destroyed = self.0.requests.iter().flat_map(|request| request.params().records.iter()).collect();
                }
                for record in destroyed {
                    if let Some(id) = record.id_string() {
                        write.remove(&id);
                    }
                }
            }
        }
    }

    /// Abort every still-pending child (releasing proxy-side resources),
    /// then this operation. Idempotent.
    pub fn abort(&self) {
        info!(operation = %self.id(), "abort");
        for request in &self.0.requests {
            if request.state() == EventualState::Pending {
                request.abort();
                self.0.proxy.abort(request);
            }
        }
        self.0.eventual.abort();
    }
}

fn merge(sets: &[ResultSet]) -> ResultSet {
    let mut records = Vec::new();
    let mut total = None;
    let mut message = None;
    for set in sets {
        records.extend_from_slice(set.records());
        if total.is_none() {
            total = set.reported_total();
        }
        if message.is_none() {
            message = set.message().map(str::to_string);
        }
    }
    ResultSet::with_meta(records, total, message)
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.0.id)
            .field("action", &self.0.action)
            .field("requests", &self.0.requests.len())
            .field("state", &self.state())
            .finish()
    }
}
