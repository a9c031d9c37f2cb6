//! Batch lookup result models

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

// == Batch Entry ==
/// Result for one key of a batch lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum BatchEntry {
    /// Payload returned by the upstream or served from the cache
    Found(Value),
    /// The upstream answered this key with an error object
    Failed(String),
}

impl BatchEntry {
    /// Classifies one value of an upstream batch response.
    ///
    /// The upstream reports per-key failures as an object carrying an
    /// `error` field, either a string or `{"title", "message"}`.
    pub fn from_upstream(value: Value) -> Self {
        match value.get("error") {
            Some(Value::String(message)) => BatchEntry::Failed(message.clone()),
            Some(error) => {
                let message = error
                    .get("message")
                    .or_else(|| error.get("title"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                BatchEntry::Failed(message)
            }
            None => BatchEntry::Found(value),
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            BatchEntry::Found(value) => Some(value),
            BatchEntry::Failed(_) => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, BatchEntry::Found(_))
    }
}

// == Batch Response ==
/// Results of a batch lookup keyed by the requested keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResponse {
    entries: HashMap<String, BatchEntry>,
}

impl BatchResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: BatchEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<&BatchEntry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BatchEntry)> {
        self.entries.iter()
    }

    /// Keys answered with an error object.
    pub fn failed_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_found())
            .map(|(key, _)| key.as_str())
    }

    pub fn into_inner(self) -> HashMap<String, BatchEntry> {
        self.entries
    }
}
