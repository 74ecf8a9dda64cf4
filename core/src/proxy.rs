use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::{Action, Request};

/// The abstract backend contract. A proxy accepts a request for one of the
/// four CRUD actions and returns nothing synchronously; it must eventually
/// make exactly one terminal call (resolve/reject) on the request's
/// embedded future, optionally preceded by progress notifications. Settling
/// may happen within the accepting call or later from backend machinery.
///
/// A `read` must honor the request's entity id and whichever pagination
/// window styles the proxy advertises.
pub trait Proxy: Send + Sync {
    fn create(&self, request: Arc<Request>);
    fn read(&self, request: Arc<Request>);
    fn update(&self, request: Arc<Request>);
    fn destroy(&self, request: Arc<Request>);

    /// Best-effort release of proxy-side resources for a request whose
    /// future has already transitioned to aborted (e.g. cancelling an
    /// in-flight transport call). Must not attempt to settle the future.
    fn abort(&self, _request: &Request) {}

    /// Dispatch on the request's action.
    fn perform(&self, request: Arc<Request>) {
        match request.action() {
            Action::Create => self.create(request),
            Action::Read => self.read(request),
            Action::Update => self.update(request),
            Action::Destroy => self.destroy(request),
        }
    }
}

impl std::fmt::Debug for dyn Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Proxy")
    }
}

/// Declarative proxy selection, resolved through a
/// [`crate::ProxyRegistry`] at store construction time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub kind: String,
    pub options: Map<String, Value>,
}

impl ProxyConfig {
    pub fn new(kind: impl Into<String>) -> Self { Self { kind: kind.into(), options: Map::new() } }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}
