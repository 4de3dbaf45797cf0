//! Decoded tabular content: a header row plus data rows of loosely-typed cells.

use super::value::Value;

/// Header names and rows as delivered by a tabular decoder.
///
/// Rows may be shorter than the header; missing trailing cells are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Sheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headers, rows }
    }

    /// Cell at `(row, column)`, `Absent` when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &Value {
        static ABSENT: Value = Value::Absent;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&ABSENT)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }
}
