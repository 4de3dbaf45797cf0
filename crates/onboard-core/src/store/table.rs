//! Append-only master table.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, trace};

use crate::mapping::{MappingResult, SchemaMapper, SourceShape};
use crate::models::record::{CanonicalRecord, RawFieldMap};
use crate::models::sheet::Sheet;
use crate::models::value::Value;

/// Row identifier column.
pub const ID_COLUMN: &str = "ID";
/// Set to the append time.
pub const CREATION_TIME_COLUMN: &str = "Creation Time";
/// Set to the append time; equal to the creation time.
pub const COMPLETION_TIME_COLUMN: &str = "Completion Time";

/// Columns the appender owns, in the order they are created.
pub const SYSTEM_COLUMNS: [&str; 3] = [ID_COLUMN, CREATION_TIME_COLUMN, COMPLETION_TIME_COLUMN];

/// Ordered columns and rows. Every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MasterTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl MasterTable {
    /// Table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with the given columns.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for column in columns {
            table.ensure_column(&column.into());
        }
        table
    }

    /// Build from decoded rows, padding short rows and dropping cells past
    /// the last header.
    pub fn from_sheet(sheet: Sheet) -> Self {
        let columns: Vec<String> = sheet.headers.iter().map(|h| h.trim().to_string()).collect();
        let width = columns.len();
        let rows = sheet
            .rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Absent);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Cell at `row` in `column`.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Every cell of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &str) -> impl Iterator<Item = &'a Value> + 'a {
        let index = self.column_index(column);
        self.rows
            .iter()
            .filter_map(move |row| index.and_then(|i| row.get(i)))
    }

    /// Add `column` if missing, back-filling existing rows with `Absent`.
    /// Returns the column index.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        if let Some(index) = self.column_index(column) {
            return index;
        }
        trace!("Adding column {:?} to {} rows", column, self.rows.len());
        self.columns.push(column.to_string());
        for row in &mut self.rows {
            row.push(Value::Absent);
        }
        self.columns.len() - 1
    }

    /// Rewrite every cell of `column` in place; no-op if the column is missing.
    pub(crate) fn convert_column(&mut self, column: &str, f: impl Fn(&Value) -> Value) {
        let Some(index) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            row[index] = f(&row[index]);
        }
    }

    /// Identifier the next appended row will get: one past the largest
    /// integral `ID`, or 1 when there is none. Saturates at `i64::MAX`.
    pub fn next_id(&self) -> i64 {
        self.column_values(ID_COLUMN)
            .filter_map(Value::as_integer)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Append a mapped record stamped with the local wall-clock time.
    pub fn append(&mut self, record: CanonicalRecord) -> i64 {
        self.append_at(record, Local::now().naive_local())
    }

    /// Append a mapped record stamped with `now`. Returns the new identifier.
    pub fn append_at(&mut self, record: CanonicalRecord, now: NaiveDateTime) -> i64 {
        let id = self.next_id();

        for column in SYSTEM_COLUMNS {
            self.ensure_column(column);
        }
        for column in record.column_names() {
            self.ensure_column(column);
        }

        let mut row = vec![Value::Absent; self.columns.len()];
        for (column, value) in record.iter() {
            if let Some(index) = self.column_index(column) {
                row[index] = value.clone();
            }
        }
        for (column, value) in [
            (ID_COLUMN, Value::Integer(id)),
            (CREATION_TIME_COLUMN, Value::DateTime(now)),
            (COMPLETION_TIME_COLUMN, Value::DateTime(now)),
        ] {
            if let Some(index) = self.column_index(column) {
                row[index] = value;
            }
        }

        self.rows.push(row);
        debug!("Appended row {} with ID {}", self.rows.len(), id);
        id
    }

    /// Map a raw field map, then append it. Raw maps never reach the table
    /// without passing through the mapper exactly once.
    pub fn append_raw(
        &mut self,
        raw: &RawFieldMap,
        mapper: &SchemaMapper,
        shape: SourceShape,
    ) -> (i64, Vec<String>) {
        let MappingResult { record, warnings } = mapper.map(raw, shape);
        (self.append(record), warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::labels::field;
    use crate::mapping::OutputProfile;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn record(name: &str) -> CanonicalRecord {
        let raw: RawFieldMap = [(field::FULL_NAME, name)].into_iter().collect();
        SchemaMapper::new(OutputProfile::Hr).map_free_text(&raw).record
    }

    fn assert_not_ragged(table: &MasterTable) {
        for row in table.rows() {
            assert_eq!(row.len(), table.columns().len());
        }
    }

    #[test]
    fn test_first_id_is_one() {
        let mut table = MasterTable::new();
        assert_eq!(table.append_at(record("Jane Doe"), now()), 1);
        assert_eq!(table.get(0, ID_COLUMN), Some(&Value::Integer(1)));
        assert_eq!(table.get(0, "First Name"), Some(&Value::from("Jane")));
    }

    #[test]
    fn test_id_follows_max() {
        let mut table = MasterTable::from_sheet(Sheet::new(
            vec!["ID".into(), "First Name".into()],
            vec![
                vec![Value::Integer(3), "A".into()],
                vec![Value::Number(7.0), "B".into()],
                vec![Value::Absent, "C".into()],
            ],
        ));
        assert_eq!(table.append_at(record("Jane Doe"), now()), 8);
    }

    #[test]
    fn test_all_ids_absent() {
        let mut table = MasterTable::from_sheet(Sheet::new(
            vec!["ID".into()],
            vec![vec![Value::Absent], vec![Value::Absent]],
        ));
        assert_eq!(table.next_id(), 1);
        assert_eq!(table.append_at(record("Jane Doe"), now()), 1);
    }

    #[test]
    fn test_huge_ids_do_not_overflow() {
        let mut table = MasterTable::from_sheet(Sheet::new(
            vec!["ID".into()],
            vec![
                vec![Value::Number(1e19)],
                vec![Value::Integer(4)],
                vec![Value::Text(i64::MAX.to_string())],
            ],
        ));
        assert_eq!(table.next_id(), i64::MAX);
        table.convert_column("ID", |v| match v {
            Value::Text(_) => Value::Absent,
            other => other.clone(),
        });
        assert_eq!(table.append_at(record("Jane Doe"), now()), 5);
    }

    #[test]
    fn test_timestamps_equal() {
        let mut table = MasterTable::new();
        table.append_at(record("Jane Doe"), now());
        assert_eq!(table.get(0, CREATION_TIME_COLUMN), Some(&Value::DateTime(now())));
        assert_eq!(table.get(0, COMPLETION_TIME_COLUMN), Some(&Value::DateTime(now())));
    }

    #[test]
    fn test_schema_completeness_with_legacy_columns() {
        let mut table = MasterTable::from_sheet(Sheet::new(
            vec!["Payroll Ref".into(), "First Name".into()],
            vec![vec!["P-1".into(), "Old".into()]],
        ));
        table.append_at(record("Jane Doe"), now());

        assert_not_ragged(&table);
        assert_eq!(table.get(0, "Payroll Ref"), Some(&Value::from("P-1")));
        assert_eq!(table.get(0, "Surname"), Some(&Value::Absent));
        assert_eq!(table.get(0, ID_COLUMN), Some(&Value::Absent));
        assert_eq!(table.get(1, "Payroll Ref"), Some(&Value::Absent));
        for (_, column) in OutputProfile::Hr.columns() {
            assert!(table.column_index(column).is_some(), "missing {column}");
        }
    }

    #[test]
    fn test_profiles_union_columns() {
        let mut table = MasterTable::new();
        table.append_at(record("Jane Doe"), now());
        let pension = SchemaMapper::new(OutputProfile::Pension)
            .map_free_text(&RawFieldMap::new())
            .record;
        table.append_at(pension, now());

        assert_not_ragged(&table);
        assert_eq!(table.get(0, "Forename"), Some(&Value::Absent));
        assert_eq!(table.get(1, "First Name"), Some(&Value::Absent));
        assert_eq!(table.get(1, ID_COLUMN), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_append_is_not_idempotent() {
        let mut table = MasterTable::new();
        let first = table.append_at(record("Jane Doe"), now());
        let second = table.append_at(record("Jane Doe"), now());
        assert_eq!(table.len(), 2);
        assert_ne!(first, second);
        assert_eq!(table.rows()[0][1..], table.rows()[1][1..]);
    }

    #[test]
    fn test_existing_rows_untouched() {
        let mut table = MasterTable::new();
        table.append_at(record("Jane Doe"), now());
        let before = table.rows()[0].clone();
        table.append_at(record("John Smith"), now());
        assert_eq!(table.rows()[0], before);
    }

    #[test]
    fn test_append_raw_maps_once() {
        let raw: RawFieldMap = [(field::DATE_OF_BIRTH, "garbage")].into_iter().collect();
        let mut table = MasterTable::new();
        let (id, warnings) = table.append_raw(&raw, &SchemaMapper::default(), SourceShape::FreeText);
        assert_eq!(id, 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(table.get(0, "Date of Birth"), Some(&Value::Absent));
    }
}
