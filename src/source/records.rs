//! Records returned by the content API
//!
//! Responses are kept as JSON objects rather than fixed structs: the only
//! validation performed is that the keys the pipelines read are present.

use crate::{IngestError, Result};
use serde_json::{Map, Value};

/// A JSON object fetched from a list or detail endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    label: String,
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(label: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            label: label.into(),
            fields,
        }
    }

    /// Wraps a JSON value, failing unless it is an object
    pub fn from_value(label: impl Into<String>, value: Value) -> Result<Self> {
        let label = label.into();
        match value {
            Value::Object(fields) => Ok(Self { label, fields }),
            other => Err(IngestError::invalid(
                &label,
                format!("expected a JSON object, got {}", json_type(&other)),
            )),
        }
    }

    /// Describes where the record came from, e.g. "gallery detail"
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns a field that must be present (its value may still be null)
    pub fn field(&self, key: &str) -> Result<&Value> {
        self.fields
            .get(key)
            .ok_or_else(|| IngestError::missing(key, &self.label))
    }

    /// Returns a field that must be a non-empty string
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.field(key)? {
            Value::String(s) if !s.is_empty() => Ok(s),
            other => Err(IngestError::invalid(
                key,
                format!("expected a non-empty string, got {}", json_type(other)),
            )),
        }
    }

    /// Returns a field that must be an array of objects; null reads as empty
    pub fn records(&self, key: &str) -> Result<Vec<Record>> {
        let label = format!("{} {}", self.label, key);
        match self.field(key)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .iter()
                .map(|item| Record::from_value(label.clone(), item.clone()))
                .collect(),
            other => Err(IngestError::invalid(
                key,
                format!("expected an array, got {}", json_type(other)),
            )),
        }
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
