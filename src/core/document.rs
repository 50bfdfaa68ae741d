use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::{DbError, Result};

/// Record identifier in the `#<cluster>:<position>` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId {
    pub cluster: u32,
    pub position: u64,
}

impl RecordId {
    pub fn new(cluster: u32, position: u64) -> Self {
        Self { cluster, position }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.cluster, self.position)
    }
}

impl FromStr for RecordId {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix('#')
            .ok_or_else(|| DbError::TypeMismatch(format!("Invalid record id: {}", s)))?;
        let (cluster, position) = body
            .split_once(':')
            .ok_or_else(|| DbError::TypeMismatch(format!("Invalid record id: {}", s)))?;

        let cluster = cluster
            .parse::<u32>()
            .map_err(|_| DbError::TypeMismatch(format!("Invalid cluster id in {}", s)))?;
        let position = position
            .parse::<u64>()
            .map_err(|_| DbError::TypeMismatch(format!("Invalid position in {}", s)))?;

        Ok(Self { cluster, position })
    }
}

/// A single result document.
///
/// Field order is preserved, so a document renders the same way every time
/// it is serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Full record view: metadata fields first, then the stored fields.
    pub fn from_record(rid: RecordId, class: &str, fields: &Map<String, Value>) -> Self {
        let mut map = Map::with_capacity(fields.len() + 2);
        map.insert("@rid".to_string(), Value::String(rid.to_string()));
        map.insert("@class".to_string(), Value::String(class.to_string()));
        for (key, value) in fields {
            map.insert(key.clone(), value.clone());
        }
        Self(map)
    }

    /// Single-field document such as `{"count": 3}`.
    pub fn scalar(name: &str, value: impl Into<Value>) -> Self {
        let mut map = Map::new();
        map.insert(name.to_string(), value.into());
        Self(map)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact single-line JSON.
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
