#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use datalith_core::{Proxy, Record, Request, RequestId, ResultSet};
use serde_json::Value;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).try_init();
}

/// Parks every incoming request so the test can settle them manually, in
/// whatever order it wants.
#[derive(Clone, Default)]
pub struct ControlledProxy {
    pending: Arc<Mutex<Vec<Arc<Request>>>>,
    aborted: Arc<Mutex<Vec<RequestId>>>,
}

impl ControlledProxy {
    pub fn new() -> Self { Self::default() }

    /// Requests in the order the proxy received them.
    pub fn requests(&self) -> Vec<Arc<Request>> { self.pending.lock().unwrap().clone() }

    pub fn request(&self, index: usize) -> Arc<Request> { self.pending.lock().unwrap()[index].clone() }

    /// Request ids passed to the abort hook, in call order.
    pub fn abort_calls(&self) -> Vec<RequestId> { self.aborted.lock().unwrap().clone() }
}

impl Proxy for ControlledProxy {
    fn create(&self, request: Arc<Request>) { self.pending.lock().unwrap().push(request) }
    fn read(&self, request: Arc<Request>) { self.pending.lock().unwrap().push(request) }
    fn update(&self, request: Arc<Request>) { self.pending.lock().unwrap().push(request) }
    fn destroy(&self, request: Arc<Request>) { self.pending.lock().unwrap().push(request) }

    fn abort(&self, request: &Request) { self.aborted.lock().unwrap().push(request.id()) }
}

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record::from(map),
        other => panic!("expected object, got {other}"),
    }
}

pub fn records(values: &[Value]) -> Vec<Record> { values.iter().map(|value| record(value.clone())).collect() }

/// A page worth of records tagged `{"id": "<tag><n>"}`, plus the grand total.
pub fn page(tag: &str, count: usize, total: u64) -> ResultSet {
    let records = (1..=count).map(|n| record(serde_json::json!({ "id": format!("{tag}{n}") }))).collect();
    ResultSet::with_meta(records, Some(total), None)
}
