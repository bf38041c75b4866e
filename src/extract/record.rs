//! Field maps and records.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field name → column index, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, usize)>,
}

impl FieldMap {
    /// Register `name` at `column`.
    ///
    /// A name that is already registered keeps its position but takes the new
    /// column; the previous column is returned.
    pub fn insert(&mut self, name: &str, column: usize) -> Option<usize> {
        match self.entries.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, column)),
            None => {
                self.entries.push((name.to_string(), column));
                None
            }
        }
    }

    /// Column index for `name`.
    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, column)| *column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .map(|(name, column)| (name.as_str(), *column))
    }

    /// Field names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One data row resolved to field name → value.
///
/// Serializes as a JSON object with fields in spreadsheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, name: &str, value: String) {
        self.fields.push((name.to_string(), value));
    }

    /// Value of the field `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// `(name, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The records of one table, in row order.
///
/// Every record carries exactly [`RecordSequence::fields`] as its keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSequence {
    fields: Vec<String>,
    records: Vec<Record>,
}

impl RecordSequence {
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        Self { fields, records }
    }

    /// Field names shared by every record.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordSequence {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
