//! Comma-separated text (.csv, .txt) as a sheet.

use csv::{ReaderBuilder, Trim};
use tracing::debug;

use super::{text_cell, Result};
use crate::models::sheet::Sheet;

/// Read a header row and every data row.
///
/// Rows must all have the header's width; a ragged file or one that is not
/// valid UTF-8 is a [`crate::error::SourceError::Delimited`] failure.
pub fn read_sheet(data: &[u8]) -> Result<Sheet> {
    read(data, false)
}

/// Read an intake form. Rows of any width are accepted: short rows leave
/// trailing cells absent and cells past the header are dropped.
pub fn read_form(data: &[u8]) -> Result<Sheet> {
    read(data, true)
}

fn read(data: &[u8], flexible: bool) -> Result<Sheet> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .flexible(flexible)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().take(headers.len()).map(text_cell).collect());
    }

    debug!("Read {} columns and {} rows of delimited text", headers.len(), rows.len());
    Ok(Sheet::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SourceError;
    use crate::models::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_headers_and_rows() {
        let sheet = read_sheet(b" Full Name ,Salary\nJane Doe,30000\nJohn Smith,\n").unwrap();
        assert_eq!(sheet.headers, vec!["Full Name", "Salary"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.cell(0, 0), &Value::from("Jane Doe"));
        assert_eq!(sheet.cell(1, 1), &Value::Absent);
    }

    #[test]
    fn test_quoted_cells_keep_commas() {
        let sheet = read_sheet(b"Home Address\n\"1 High St, Leeds\"\n").unwrap();
        assert_eq!(sheet.cell(0, 0), &Value::from("1 High St, Leeds"));
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let sheet = read_sheet("\u{feff}Title,Surname\nMs,Doe\n".as_bytes()).unwrap();
        assert_eq!(sheet.headers[0], "Title");
    }

    #[test]
    fn test_header_only() {
        let sheet = read_sheet(b"Title,Surname\n").unwrap();
        assert!(sheet.rows.is_empty());
    }

    #[test]
    fn test_ragged_rows_fail() {
        let err = read_sheet(b"A,B\n1,2,3\n").unwrap_err();
        assert!(matches!(err, SourceError::Delimited(_)));
    }

    #[test]
    fn test_form_accepts_ragged_rows() {
        let sheet = read_form(b"Full Name,Salary\nJane Doe,30000\nJohn\nA,B,C\n").unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.cell(0, 1), &Value::from("30000"));
        assert_eq!(sheet.cell(1, 1), &Value::Absent);
        assert_eq!(sheet.rows[2].len(), 2);
    }

    #[test]
    fn test_form_rejects_invalid_utf8() {
        let err = read_form(b"Full Name\n\xff\xfe\n").unwrap_err();
        assert!(matches!(err, SourceError::Delimited(_)));
    }
}
