use crate::core::{Document, RecordId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document and its position inside the class cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub position: u64,
    pub fields: Map<String, Value>,
}

/// A named collection of schemaless documents.
///
/// Positions are handed out monotonically and never reused, so a record id
/// stays valid for as long as its record exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentClass {
    name: String,
    cluster_id: u32,
    next_position: u64,
    #[serde(default)]
    declared_fields: Vec<String>,
    #[serde(default)]
    records: Vec<Record>,
}

impl DocumentClass {
    pub fn new(name: impl Into<String>, cluster_id: u32, declared_fields: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cluster_id,
            next_position: 0,
            declared_fields,
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cluster_id(&self) -> u32 {
        self.cluster_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> impl Iterator<Item = &mut Record> {
        self.records.iter_mut()
    }

    pub fn rid(&self, record: &Record) -> RecordId {
        RecordId::new(self.cluster_id, record.position)
    }

    /// Append a document and return its full record view.
    pub fn insert(&mut self, fields: Map<String, Value>) -> Document {
        let record = Record {
            position: self.next_position,
            fields,
        };
        self.next_position += 1;

        let document = Document::from_record(self.rid(&record), &self.name, &record.fields);
        self.records.push(record);
        document
    }

    /// Remove every record for which `predicate` returns true.
    ///
    /// The predicate runs over all records first; if it fails for any of
    /// them the class is left untouched.
    pub fn remove_where<F>(&mut self, predicate: F) -> crate::core::Result<usize>
    where
        F: FnMut(&Record) -> crate::core::Result<bool>,
    {
        let doomed = self.evaluate_all(predicate)?;

        let before = self.records.len();
        let mut flags = doomed.into_iter();
        self.records.retain(|_| !flags.next().unwrap_or(false));
        Ok(before - self.records.len())
    }

    /// Evaluate `predicate` for every record, in storage order, without
    /// touching any of them.
    pub fn evaluate_all<F>(&self, predicate: F) -> crate::core::Result<Vec<bool>>
    where
        F: FnMut(&Record) -> crate::core::Result<bool>,
    {
        self.records.iter().map(predicate).collect()
    }

    pub fn to_document(&self, record: &Record) -> Document {
        Document::from_record(self.rid(record), &self.name, &record.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(name: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), json!(name));
        map
    }

    #[test]
    fn test_positions_are_never_reused() {
        let mut class = DocumentClass::new("Person", 9, Vec::new());
        class.insert(fields("a"));
        class.insert(fields("b"));

        let removed = class
            .remove_where(|r| Ok(r.fields.get("name") == Some(&json!("b"))))
            .unwrap();
        assert_eq!(removed, 1);

        let doc = class.insert(fields("c"));
        assert_eq!(doc.get("@rid"), Some(&json!("#9:2")));
        assert_eq!(class.len(), 2);
    }

    #[test]
    fn test_failed_predicate_keeps_every_record() {
        let mut class = DocumentClass::new("Person", 1, Vec::new());
        for name in ["a", "b", "c"] {
            class.insert(fields(name));
        }

        let err = class.remove_where(|r| {
            if r.fields.get("name") == Some(&json!("b")) {
                Err(crate::core::DbError::TypeMismatch("bad".into()))
            } else {
                Ok(true)
            }
        });
        assert!(err.is_err());
        assert_eq!(class.len(), 3);
    }
}
