use serde::{Deserialize, Serialize};

use crate::record::Record;

/// An immutable bundle of extracted records plus optional total-count and
/// message metadata. Built by a [`crate::Reader`]; consumed by request and
/// operation callers. `records` is never null - an empty read yields an
/// empty sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    records: Vec<Record>,
    total: Option<u64>,
    message: Option<String>,
}

impl ResultSet {
    pub fn new(records: Vec<Record>) -> Self { Self { records, total: None, message: None } }

    pub fn with_meta(records: Vec<Record>, total: Option<u64>, message: Option<String>) -> Self { Self { records, total, message } }

    pub fn empty() -> Self { Self::new(Vec::new()) }

    pub fn records(&self) -> &[Record] { &self.records }

    pub fn into_records(self) -> Vec<Record> { self.records }

    /// The backend-reported grand total for windowed reads, falling back to
    /// the extracted record count when the backend reported none.
    pub fn total(&self) -> u64 { self.total.unwrap_or(self.records.len() as u64) }

    /// The total exactly as reported, if any.
    pub fn reported_total(&self) -> Option<u64> { self.total }

    pub fn message(&self) -> Option<&str> { self.message.as_deref() }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

impl Default for ResultSet {
    fn default() -> Self { Self::empty() }
}
