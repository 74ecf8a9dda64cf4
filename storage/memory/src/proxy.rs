use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;
use ulid::Ulid;

use datalith_core::error::{DataError, WriteError};
use datalith_core::{Progress, Proxy, ProxyRegistry, PropertyPath, Reader, Record, Request, JsonWriter, WriteBody, Writer};

use crate::engine::MemoryEngine;

/// The reference proxy: serves all four CRUD actions from a
/// [`MemoryEngine`], settling requests synchronously. Write payloads go
/// through the configured writer before storage; read responses are wrapped
/// into a `{data, total}` payload and extracted by the configured reader,
/// exercising the same conversion pipeline a transport-backed proxy would.
pub struct MemoryProxy {
    engine: MemoryEngine,
    reader: Reader,
    writer: Arc<dyn Writer>,
}

impl MemoryProxy {
    pub fn new(engine: MemoryEngine) -> Self {
        let reader = Reader::new()
            .data(PropertyPath::parse("data").expect("static path"))
            .total(PropertyPath::parse("total").expect("static path"));
        Self { engine, reader, writer: Arc::new(JsonWriter::new()) }
    }

    /// Replace the default `{data, total}` reader. The reader must match
    /// the shape produced by this proxy's writer for round trips to hold.
    pub fn with_reader(mut self, reader: Reader) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn Writer>) -> Self {
        self.writer = writer;
        self
    }

    /// Register the "memory" proxy kind against a shared engine.
    pub fn register(registry: &mut ProxyRegistry, engine: MemoryEngine) {
        registry.register("memory", move |_config| Ok(Arc::new(MemoryProxy::new(engine.clone())) as Arc<dyn Proxy>));
    }

    fn respond(&self, request: &Request, values: Vec<Value>, total: u64) {
        let raw = json!({ "data": values, "total": total });
        match self.reader.read(&raw) {
            Ok(results) => request.resolve(results),
            Err(error) => request.reject(error.into()),
        }
    }

    fn write_record(&self, record: Record) -> Result<Value, WriteError> { self.writer.write(&WriteBody::One(record)) }
}

impl Proxy for MemoryProxy {
    fn create(&self, request: Arc<Request>) {
        let store = self.engine.collection(request.collection());
        let records = &request.params().records;
        if records.is_empty() {
            request.reject(WriteError::Empty.into());
            return;
        }
        let total = records.len();
        let mut written = Vec::with_capacity(total);
        for (i, record) in records.iter().enumerate() {
            let mut record = record.clone();
            let id = match record.id_string() {
                Some(id) => id,
                None => {
                    let id = Ulid::new().to_string();
                    record.set("id", id.clone());
                    id
                }
            };
            let value = match self.write_record(record) {
                Ok(value) => value,
                Err(error) => {
                    request.reject(error.into());
                    return;
                }
            };
            debug!(collection = %request.collection(), %id, "create");
            store.set(id, value.clone());
            written.push(value);
            request.notify(&Progress { completed: i + 1, total: Some(total) });
        }
        let count = written.len() as u64;
        self.respond(&request, written, count);
    }

    fn read(&self, request: Arc<Request>) {
        let store = self.engine.collection(request.collection());
        let params = request.params();

        if let Some(id) = &params.entity_id {
            debug!(collection = %request.collection(), %id, "read one");
            match store.get(id) {
                Some(value) => self.respond(&request, vec![value], 1),
                None => request.reject(DataError::NotFound(id.clone())),
            }
            return;
        }

        let (values, total) = match params.window {
            Some(window) => store.scan(window.offset(), Some(window.limit())),
            None => store.scan(0, None),
        };
        debug!(collection = %request.collection(), window = ?params.window, returned = values.len(), total, "read");
        self.respond(&request, values, total);
    }

    fn update(&self, request: Arc<Request>) {
        let store = self.engine.collection(request.collection());
        let records = &request.params().records;
        if records.is_empty() {
            request.reject(WriteError::Empty.into());
            return;
        }
        let total = records.len();
        let mut written = Vec::with_capacity(total);
        for (i, record) in records.iter().enumerate() {
            let id = match record.id_string() {
                Some(id) => id,
                None => {
                    request.reject(DataError::Backend("update record has no id".to_string()));
                    return;
                }
            };
            if !store.contains(&id) {
                request.reject(DataError::NotFound(id));
                return;
            }
            let value = match self.write_record(record.clone()) {
                Ok(value) => value,
                Err(error) => {
                    request.reject(error.into());
                    return;
                }
            };
            debug!(collection = %request.collection(), %id, "update");
            store.set(id, value.clone());
            written.push(value);
            request.notify(&Progress { completed: i + 1, total: Some(total) });
        }
        let count = written.len() as u64;
        self.respond(&request, written, count);
    }

    fn destroy(&self, request: Arc<Request>) {
        let store = self.engine.collection(request.collection());
        let records = &request.params().records;
        let mut removed = Vec::with_capacity(records.len());
        for record in records {
            let id = match record.id_string() {
                Some(id) => id,
                None => {
                    request.reject(DataError::Backend("destroy record has no id".to_string()));
                    return;
                }
            };
            match store.remove(&id) {
                Some(value) => {
                    debug!(collection = %request.collection(), %id, "destroy");
                    removed.push(value);
                }
                None => {
                    request.reject(DataError::NotFound(id));
                    return;
                }
            }
        }
        let count = removed.len() as u64;
        self.respond(&request, removed, count);
    }
}
