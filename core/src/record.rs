use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An untyped record: an ordered field map as extracted by a
/// [`crate::Reader`] or supplied to a [`crate::Writer`]. Field values are
/// arbitrary JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self { Self(Map::new()) }

    pub fn get(&self, field: &str) -> Option<&Value> { self.0.get(field) }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) { self.0.insert(field.into(), value.into()); }

    pub fn remove(&mut self, field: &str) -> Option<Value> { self.0.remove(field) }

    /// The record's identifier field, when present.
    pub fn id(&self) -> Option<&Value> { self.get("id") }

    /// String form of the identifier, used as the key into backend stores
    /// and collection indexes. Numeric ids stringify.
    pub fn id_string(&self) -> Option<String> {
        match self.id()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn fields(&self) -> &Map<String, Value> { &self.0 }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> { &mut self.0 }

    pub fn into_value(self) -> Value { Value::Object(self.0) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self { Self(fields) }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self { Value::Object(record.0) }
}
