//! Row domain types.
//!
//! A [`Row`] is one canonical record of a dataset. Its [`Fields`] keep the
//! source column/key order, and every value is a string: normalization
//! happens once at ingest, never again downstream.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Separator between `key: value` pairs in a row's flattened text.
pub const ROW_TEXT_DELIMITER: &str = " | ";

/// Ordered string → string mapping.
///
/// Insertion order is the source column order. Inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, String)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert a field, returning the previous value if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Flatten into `"key: value"` pairs joined by [`ROW_TEXT_DELIMITER`].
    ///
    /// This is the only text the retrieval engine scores against.
    pub fn to_text(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(ROW_TEXT_DELIMITER)
    }

    /// Compact JSON object in field order, e.g. `{"name":"Alice","dept":"HR"}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of string keys to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Fields::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    fields.insert(key, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// A single persisted row of a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Owning dataset
    pub dataset_id: String,

    /// Zero-based position in the source file
    pub row_index: usize,

    /// Ordered, string-valued fields
    pub fields: Fields,
}

impl Row {
    pub fn new(dataset_id: impl Into<String>, row_index: usize, fields: Fields) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            row_index,
            fields,
        }
    }

    /// Derived scoring text; always recomputed from `fields`.
    pub fn text(&self) -> String {
        self.fields.to_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Fields {
        [("name", "Alice"), ("dept", "HR"), ("city", "Lyon")]
            .into_iter()
            .collect()
    }

    #[test]
    fn insertion_order_is_preserved() {
        let fields = alice();
        let keys: Vec<&str> = fields.keys().collect();
        assert_eq!(keys, vec!["name", "dept", "city"]);
    }

    #[test]
    fn insert_existing_key_replaces_in_place() {
        let mut fields = alice();
        let previous = fields.insert("dept", "Finance");
        assert_eq!(previous.as_deref(), Some("HR"));
        assert_eq!(fields.len(), 3);
        assert_eq!(fields.keys().nth(1), Some("dept"));
        assert_eq!(fields.get("dept"), Some("Finance"));
    }

    #[test]
    fn text_flattens_pairs() {
        assert_eq!(alice().to_text(), "name: Alice | dept: HR | city: Lyon");
        assert_eq!(Fields::new().to_text(), "");
    }

    #[test]
    fn json_keeps_field_order() {
        let fields: Fields = [("zeta", "1"), ("alpha", "")].into_iter().collect();
        assert_eq!(fields.to_json(), r#"{"zeta":"1","alpha":""}"#);

        let parsed: Fields = serde_json::from_str(r#"{"zeta":"1","alpha":""}"#).unwrap();
        assert_eq!(parsed, fields);
    }

    #[test]
    fn non_string_values_are_rejected_on_decode() {
        let parsed: Result<Fields, _> = serde_json::from_str(r#"{"a":1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn row_text_tracks_fields() {
        let mut row = Row::new("ds", 0, alice());
        row.fields.insert("city", "Paris");
        assert!(row.text().ends_with("city: Paris"));
    }
}
