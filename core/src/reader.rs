use serde_json::Value;
use tracing::debug;

use crate::error::ReadError;
use crate::path::PropertyPath;
use crate::record::Record;
use crate::resultset::ResultSet;

/// Renames (or deletes) one record field. The source side supports full
/// dotted/escaped addressing into nested fields; an empty target key deletes
/// the source field instead of renaming it.
#[derive(Debug, Clone)]
pub struct Mapping {
    pub from: PropertyPath,
    pub to: String,
}

/// Converts a raw backend payload into a [`ResultSet`] by locating records
/// and metadata via configured property paths.
///
/// With no `data` path the payload root itself is the record source. Missing
/// `total`/`message` paths are errors when configured - metadata is never
/// silently defaulted.
#[derive(Debug, Clone, Default)]
pub struct Reader {
    data: Option<PropertyPath>,
    total: Option<PropertyPath>,
    message: Option<PropertyPath>,
    mappings: Vec<Mapping>,
}

impl Reader {
    pub fn new() -> Self { Self::default() }

    pub fn data(mut self, path: PropertyPath) -> Self {
        self.data = Some(path);
        self
    }

    pub fn total(mut self, path: PropertyPath) -> Self {
        self.total = Some(path);
        self
    }

    pub fn message(mut self, path: PropertyPath) -> Self {
        self.message = Some(path);
        self
    }

    pub fn map(mut self, from: PropertyPath, to: impl Into<String>) -> Self {
        self.mappings.push(Mapping { from, to: to.into() });
        self
    }

    pub fn read(&self, raw: &Value) -> Result<ResultSet, ReadError> {
        let data = match &self.data {
            Some(path) => path.get(raw),
            None => Some(raw),
        };

        let mut records = match data {
            // A configured data path absent from the payload is an empty read
            None => Vec::new(),
            Some(Value::Array(items)) => {
                let mut records = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(fields) => records.push(Record::from(fields.clone())),
                        other => {
                            return Err(ReadError::WrongShape {
                                path: self.data_path_name(),
                                expected: "object",
                                got: json_type(other),
                            })
                        }
                    }
                }
                records
            }
            // A single object wraps into a one-record sequence
            Some(Value::Object(fields)) => vec![Record::from(fields.clone())],
            Some(other) => {
                return Err(ReadError::WrongShape { path: self.data_path_name(), expected: "object or array", got: json_type(other) })
            }
        };

        if !self.mappings.is_empty() {
            for record in &mut records {
                self.apply_mappings(record);
            }
        }

        let total = match &self.total {
            Some(path) => match path.get(raw) {
                Some(value) => Some(
                    value
                        .as_u64()
                        .ok_or_else(|| ReadError::WrongShape { path: path.to_string(), expected: "unsigned integer", got: json_type(value) })?,
                ),
                None => return Err(ReadError::MissingTotal(path.to_string())),
            },
            None => None,
        };

        let message = match &self.message {
            Some(path) => match path.get(raw) {
                Some(value) => Some(
                    value
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ReadError::WrongShape { path: path.to_string(), expected: "string", got: json_type(value) })?,
                ),
                None => return Err(ReadError::MissingMessage(path.to_string())),
            },
            None => None,
        };

        debug!(records = records.len(), ?total, "read payload");
        Ok(ResultSet::with_meta(records, total, message))
    }

    fn apply_mappings(&self, record: &mut Record) {
        let mut tree = Value::Object(std::mem::take(record.fields_mut()));
        for mapping in &self.mappings {
            if let Some(value) = mapping.from.take(&mut tree) {
                if !mapping.to.is_empty() {
                    if let Some(fields) = tree.as_object_mut() {
                        fields.insert(mapping.to.clone(), value);
                    }
                }
            }
        }
        if let Value::Object(fields) = tree {
            *record = Record::from(fields);
        }
    }

    fn data_path_name(&self) -> String { self.data.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "<root>".to_string()) }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
