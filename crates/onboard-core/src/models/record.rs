//! Per-source extraction results and mapped records.

use std::collections::BTreeMap;

use serde::Serialize;

use super::value::Value;

/// Field name to raw value, as produced by one extractor pass.
///
/// A key is present only if the field was detected in the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawFieldMap {
    fields: BTreeMap<String, Value>,
}

impl RawFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, overwriting any earlier value for the same name.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Exact-name lookup.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Lookup ignoring ASCII case and surrounding whitespace of stored names.
    pub fn get_ignore_case(&self, field: &str) -> Option<&Value> {
        self.get(field).or_else(|| {
            self.fields
                .iter()
                .find(|(name, _)| name.trim().eq_ignore_ascii_case(field))
                .map(|(_, value)| value)
        })
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for RawFieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A record rendered into an output profile's column list.
///
/// Column order follows the profile; every profile column is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalRecord {
    columns: Vec<(String, Value)>,
}

impl CanonicalRecord {
    pub(crate) fn from_columns(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Value of a column, `None` if the column is not part of this record.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut map = RawFieldMap::new();
        map.insert("Job Title", "Pilot");
        map.insert("Job Title", "Captain");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Job Title"), Some(&Value::from("Captain")));
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let map: RawFieldMap = [(" Basic Salary ", "30000")].into_iter().collect();
        assert_eq!(map.get_ignore_case("basic salary"), Some(&Value::from("30000")));
        assert_eq!(map.get_ignore_case("salary"), None);
    }
}
