use serde_json::{Map, Value};

use crate::error::WriteError;
use crate::record::Record;

/// Write payload: a single record routes through `write_one`, a sequence is
/// processed per-record and handed whole to `write_many`.
#[derive(Debug, Clone)]
pub enum WriteBody {
    One(Record),
    Many(Vec<Record>),
}

/// The inverse of [`crate::Reader`]: converts in-memory record(s) into the
/// serializable form a proxy sends to its backend. Implementations decide
/// the concrete output shape; the per-field transform hook runs before
/// serialization.
pub trait Writer: Send + Sync {
    /// Per-field transform applied to every record field before
    /// serialization. Default: identity.
    fn transform_field(&self, _field: &str, value: &Value) -> Value { value.clone() }

    fn write_one(&self, record: Value) -> Result<Value, WriteError>;

    fn write_many(&self, records: Vec<Value>) -> Result<Value, WriteError>;

    fn write(&self, body: &WriteBody) -> Result<Value, WriteError> {
        match body {
            WriteBody::One(record) => self.write_one(self.process(record)),
            WriteBody::Many(records) => {
                if records.is_empty() {
                    return Err(WriteError::Empty);
                }
                self.write_many(records.iter().map(|record| self.process(record)).collect())
            }
        }
    }

    /// Run the field transform over one record.
    fn process(&self, record: &Record) -> Value {
        let mut fields = Map::new();
        for (field, value) in record.fields() {
            fields.insert(field.clone(), self.transform_field(field, value));
        }
        Value::Object(fields)
    }
}

/// JSON writer: one record serializes as an object, many as an array,
/// optionally wrapped under a root property. Fields listed in
/// `date_fields` holding epoch-millisecond integers render as formatted
/// date strings when a `date_format` is set.
#[derive(Debug, Clone, Default)]
pub struct JsonWriter {
    root: Option<String>,
    date_format: Option<String>,
    date_fields: Vec<String>,
}

impl JsonWriter {
    pub fn new() -> Self { Self::default() }

    pub fn root(mut self, property: impl Into<String>) -> Self {
        self.root = Some(property.into());
        self
    }

    pub fn date_format(mut self, format: impl Into<String>, fields: Vec<String>) -> Self {
        self.date_format = Some(format.into());
        self.date_fields = fields;
        self
    }

    fn envelope(&self, payload: Value) -> Value {
        match &self.root {
            Some(root) => {
                let mut map = Map::new();
                map.insert(root.clone(), payload);
                Value::Object(map)
            }
            None => payload,
        }
    }
}

impl Writer for JsonWriter {
    fn transform_field(&self, field: &str, value: &Value) -> Value {
        if let (Some(format), Some(millis)) = (&self.date_format, value.as_i64()) {
            if self.date_fields.iter().any(|f| f == field) {
                if let Some(datetime) = chrono::DateTime::from_timestamp_millis(millis) {
                    return Value::String(datetime.format(format).to_string());
                }
            }
        }
        value.clone()
    }

    fn write_one(&self, record: Value) -> Result<Value, WriteError> { Ok(self.envelope(record)) }

    fn write_many(&self, records: Vec<Value>) -> Result<Value, WriteError> { Ok(self.envelope(Value::Array(records))) }
}
