use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::DataError;
use crate::eventual::{Eventual, EventualState, Progress, Settled};
use crate::id::{CollectionId, RequestId};
use crate::record::Record;
use crate::resultset::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Create,
    Read,
    Update,
    Destroy,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Create => write!(f, "create"),
            Action::Read => write!(f, "read"),
            Action::Update => write!(f, "update"),
            Action::Destroy => write!(f, "destroy"),
        }
    }
}

/// Pagination window for a read request. Proxies honor whichever styles
/// they advertise; both normalize to an offset/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Window {
    Page { page: u32, size: u32 },
    Range { start: u64, limit: u64 },
}

impl Window {
    pub fn offset(&self) -> u64 {
        match self {
            Window::Page { page, size } => (*page as u64).saturating_sub(1) * *size as u64,
            Window::Range { start, .. } => *start,
        }
    }

    pub fn limit(&self) -> u64 {
        match self {
            Window::Page { size, .. } => *size as u64,
            Window::Range { limit, .. } => *limit,
        }
    }
}

/// Action-specific parameters for one physical call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestParams {
    /// Single-entity read target.
    pub entity_id: Option<String>,
    pub window: Option<Window>,
    /// Write payload for create/update/destroy.
    pub records: Vec<Record>,
    /// Backend-specific knobs, passed through opaquely.
    pub extra: Map<String, Value>,
}

impl RequestParams {
    pub fn entity(id: impl Into<String>) -> Self { Self { entity_id: Some(id.into()), ..Self::default() } }

    pub fn windowed(window: Window) -> Self { Self { window: Some(window), ..Self::default() } }

    pub fn records(records: Vec<Record>) -> Self { Self { records, ..Self::default() } }
}

/// One Future-bearing unit of work scoped to a single physical CRUD call.
///
/// Created by an Operation, handed to a Proxy, settled exactly once (or
/// aborted by its owner), never reused. Whatever the proxy reports is
/// retained for inspection even when it arrives after an abort - the
/// embedded future simply no longer fires.
pub struct Request {
    id: RequestId,
    action: Action,
    collection: CollectionId,
    params: RequestParams,
    eventual: Eventual<ResultSet, DataError>,
    reported: Mutex<Option<Settled<ResultSet, DataError>>>,
}

impl Request {
    pub fn new(action: Action, collection: CollectionId, params: RequestParams) -> Self {
        Self { id: RequestId::new(), action, collection, params, eventual: Eventual::new(), reported: Mutex::new(None) }
    }

    pub fn id(&self) -> RequestId { self.id }

    pub fn action(&self) -> Action { self.action }

    pub fn collection(&self) -> &CollectionId { &self.collection }

    pub fn params(&self) -> &RequestParams { &self.params }

    pub fn eventual(&self) -> &Eventual<ResultSet, DataError> { &self.eventual }

    pub fn state(&self) -> EventualState { self.eventual.state() }

    pub fn notify(&self, progress: &Progress) { self.eventual.notify(progress) }

    pub fn resolve(&self, results: ResultSet) {
        debug!(request = %self.id, action = %self.action, records = results.len(), "resolve");
        *self.reported.lock().unwrap() = Some(Settled::Resolved(results.clone()));
        self.eventual.resolve(results);
    }

    pub fn reject(&self, error: DataError) {
        debug!(request = %self.id, action = %self.action, %error, "reject");
        *self.reported.lock().unwrap() = Some(Settled::Rejected(error.clone()));
        self.eventual.reject(error);
    }

    pub fn abort(&self) {
        debug!(request = %self.id, action = %self.action, "abort");
        self.eventual.abort();
    }

    /// What the proxy reported for this request, if it reported at all.
    /// Unlike the future's outcome this survives a preceding abort, so a
    /// cancelled request remains inspectable for diagnostics.
    pub fn reported(&self) -> Option<Settled<ResultSet, DataError>> { self.reported.lock().unwrap().clone() }

    /// The settled outcome of the embedded future.
    pub fn result(&self) -> Option<Settled<ResultSet, DataError>> { self.eventual.outcome() }
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{} {} {}", self.id, self.action, self.collection) }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("action", &self.action)
            .field("collection", &self.collection)
            .field("state", &self.state())
            .finish()
    }
}
