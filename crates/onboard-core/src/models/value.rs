//! Loosely-typed scalar shared by source cells, raw field maps and the master table.

use std::borrow::Cow;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A single cell value.
///
/// `Absent` is the explicit "no value" marker. It is distinct from
/// `Text("")`, although both count as blank for synonym resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value.
    #[default]
    Absent,
    /// Free text.
    Text(String),
    /// Whole number (identifiers, integral spreadsheet cells).
    Integer(i64),
    /// Floating point number.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// Date with time of day.
    DateTime(NaiveDateTime),
}

impl Value {
    /// Build a text value, mapping empty/whitespace-only input to `Absent`.
    pub fn text_or_absent(s: impl AsRef<str>) -> Self {
        let s = s.as_ref().trim();
        if s.is_empty() {
            Self::Absent
        } else {
            Self::Text(s.to_string())
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Absent, or text that is empty once trimmed.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Borrow the inner string of a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integral view of the value, used for identifier arithmetic.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Number(n)
                if n.fract() == 0.0 && *n >= i64::MIN as f64 && *n < i64::MAX as f64 =>
            {
                Some(*n as i64)
            }
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Render the value as text; `Absent` renders as an empty string.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            Self::Absent => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s),
            Self::Integer(n) => Cow::Owned(n.to_string()),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Bool(b) => Cow::Owned(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Self::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Cow::Owned(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

/// Integral floats print without a trailing `.0`.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("NA"),
            other => f.write_str(&other.render()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_values() {
        assert!(Value::Absent.is_blank());
        assert!(Value::Text("  ".into()).is_blank());
        assert!(!Value::Text("x".into()).is_blank());
        assert!(!Value::Integer(0).is_blank());
        assert!(!Value::Text(String::new()).is_absent());
    }

    #[test]
    fn test_render() {
        assert_eq!(Value::Number(30000.0).render(), "30000");
        assert_eq!(Value::Number(1.5).render(), "1.5");
        assert_eq!(
            Value::Date(NaiveDate::from_ymd_opt(1987, 3, 1).unwrap()).render(),
            "1987-03-01"
        );
        assert_eq!(Value::Absent.render(), "");
        assert_eq!(Value::Absent.to_string(), "NA");
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(Value::Integer(7).as_integer(), Some(7));
        assert_eq!(Value::Number(8.0).as_integer(), Some(8));
        assert_eq!(Value::Text(" 9 ".into()).as_integer(), Some(9));
        assert_eq!(Value::Number(1.5).as_integer(), None);
        assert_eq!(Value::Number(1e19).as_integer(), None);
        assert_eq!(Value::Number(f64::NAN).as_integer(), None);
        assert_eq!(Value::Absent.as_integer(), None);
    }

    #[test]
    fn test_json_shape() {
        let values = vec![Value::Absent, Value::from("a"), Value::Integer(3)];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[null,"a",3]"#);
    }
}
