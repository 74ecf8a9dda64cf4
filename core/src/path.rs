use serde_json::Value;

use crate::error::ConfigError;

/// A dot-delimited property path into a nested JSON tree. A dot steps into
/// a nested object; a literal dot inside a key is escaped with a backslash,
/// so `foo\.bar` addresses the key `"foo.bar"` at the current level rather
/// than key `bar` inside `foo`.
///
/// Parsing is strict: empty segments and trailing escapes are rejected at
/// config time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath {
    raw: String,
    segments: Vec<String>,
}

impl PropertyPath {
    pub fn parse(path: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = path.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err(ConfigError::MalformedPath { path: path.to_string(), reason: "trailing escape" }),
                },
                '.' => {
                    if current.is_empty() {
                        return Err(ConfigError::MalformedPath { path: path.to_string(), reason: "empty segment" });
                    }
                    segments.push(std::mem::take(&mut current));
                }
                c => current.push(c),
            }
        }
        if current.is_empty() {
            return Err(ConfigError::MalformedPath { path: path.to_string(), reason: "empty segment" });
        }
        segments.push(current);
        Ok(Self { raw: path.to_string(), segments })
    }

    pub fn segments(&self) -> &[String] { &self.segments }

    pub fn as_str(&self) -> &str { &self.raw }

    /// Walk the tree segment by segment. None when any step is absent or a
    /// non-object is stepped into.
    pub fn get<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        let mut current = root;
        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Remove and return the addressed value, leaving the rest of the tree
    /// intact. Used by data mappings to relocate fields.
    pub fn take(&self, root: &mut Value) -> Option<Value> {
        let (last, front) = self.segments.split_last().expect("parse rejects empty paths");
        let mut current = root;
        for segment in front {
            current = current.as_object_mut()?.get_mut(segment)?;
        }
        current.as_object_mut()?.remove(last)
    }
}

impl TryFrom<&str> for PropertyPath {
    type Error = ConfigError;
    fn try_from(path: &str) -> Result<Self, Self::Error> { Self::parse(path) }
}

impl std::fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.raw) }
}
