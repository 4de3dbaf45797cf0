//! Row-oriented extraction for delimited text and spreadsheets.
//!
//! Column headers already carry field names, so no label scan happens here.
//! Header spellings are reconciled later by the tabular synonym table.

use tracing::debug;

use crate::models::record::RawFieldMap;
use crate::models::sheet::Sheet;

/// Which data rows become records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPolicy {
    /// Only the first data row is one employee (delimited text).
    FirstRow,
    /// Every non-blank data row is an employee (spreadsheets).
    EveryRow,
}

/// Turns a decoded sheet into raw field maps keyed by trimmed header names.
pub struct TabularExtractor {
    policy: RowPolicy,
}

impl TabularExtractor {
    pub fn new(policy: RowPolicy) -> Self {
        Self { policy }
    }

    pub fn extract(&self, sheet: &Sheet) -> Vec<RawFieldMap> {
        let headers: Vec<&str> = sheet.headers.iter().map(|h| h.trim()).collect();

        let records: Vec<RawFieldMap> = match self.policy {
            RowPolicy::FirstRow => (0..sheet.rows.len().min(1))
                .map(|row| row_to_record(sheet, &headers, row))
                .collect(),
            RowPolicy::EveryRow => (0..sheet.rows.len())
                .map(|row| row_to_record(sheet, &headers, row))
                .filter(|record| !record.is_empty())
                .collect(),
        };

        debug!(
            "Extracted {} records from {} rows ({:?})",
            records.len(),
            sheet.rows.len(),
            self.policy
        );
        records
    }
}

fn row_to_record(sheet: &Sheet, headers: &[&str], row: usize) -> RawFieldMap {
    headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.is_empty())
        .map(|(col, header)| (*header, sheet.cell(row, col)))
        .filter(|(_, value)| !value.is_blank())
        .map(|(header, value)| (header, value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::value::Value;
    use pretty_assertions::assert_eq;

    fn sheet() -> Sheet {
        Sheet::new(
            vec![" First Name ".into(), "Surname".into(), "".into()],
            vec![
                vec!["Jane".into(), "Doe".into(), "ignored".into()],
                vec![Value::Absent, Value::Text("  ".into())],
                vec!["John".into()],
            ],
        )
    }

    #[test]
    fn test_first_row_only() {
        let records = TabularExtractor::new(RowPolicy::FirstRow).extract(&sheet());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("First Name"), Some(&Value::from("Jane")));
        assert_eq!(records[0].get("Surname"), Some(&Value::from("Doe")));
        assert_eq!(records[0].len(), 2);
    }

    #[test]
    fn test_every_row_skips_blank_rows() {
        let records = TabularExtractor::new(RowPolicy::EveryRow).extract(&sheet());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("First Name"), Some(&Value::from("John")));
        assert!(!records[1].contains("Surname"));
    }

    #[test]
    fn test_empty_sheet() {
        let records = TabularExtractor::new(RowPolicy::FirstRow).extract(&Sheet::default());
        assert!(records.is_empty());
    }
}
