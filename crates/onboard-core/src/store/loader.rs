//! Loading an existing master file into a [`MasterTable`].

use tracing::{debug, info};

use super::table::{MasterTable, COMPLETION_TIME_COLUMN, CREATION_TIME_COLUMN, ID_COLUMN};
use crate::error::SourceError;
use crate::extract::{normalize_date, parse_timestamp};
use crate::mapping::OutputProfile;
use crate::source::{delimited, xlsx, SourceKind};
use crate::models::value::Value;

/// Load a master file previously written by [`super::export`] (or by hand).
///
/// `ID` cells become integers when integral, the profile's date columns
/// become dates and the timestamp columns become date-times. Cells that do
/// not parse, and every other column, are kept as read.
pub fn load_master(
    data: &[u8],
    file_name: &str,
    profile: OutputProfile,
) -> Result<MasterTable, SourceError> {
    let kind = SourceKind::from_file_name(file_name)?;
    let reader = match kind {
        SourceKind::Spreadsheet => xlsx::read_sheet,
        SourceKind::Delimited => delimited::read_sheet,
        other => {
            return Err(SourceError::UnsupportedKind(format!(
                "{} as master file",
                other.name()
            )));
        }
    };

    if data.is_empty() {
        debug!("Master file {} is empty", file_name);
        return Ok(MasterTable::new());
    }

    let sheet = reader(data)?;
    if sheet.is_empty() {
        debug!("Master file {} has no header row", file_name);
        return Ok(MasterTable::new());
    }
    let mut table = MasterTable::from_sheet(sheet);

    table.convert_column(ID_COLUMN, |v| {
        v.as_integer().map_or_else(|| v.clone(), Value::Integer)
    });
    for column in profile.date_columns() {
        table.convert_column(column, |v| match v {
            Value::Absent | Value::Date(_) => v.clone(),
            other => normalize_date(other).map_or_else(|| other.clone(), Value::Date),
        });
    }
    for column in [CREATION_TIME_COLUMN, COMPLETION_TIME_COLUMN] {
        table.convert_column(column, |v| match v {
            Value::Text(s) => parse_timestamp(s).map_or_else(|| v.clone(), Value::DateTime),
            _ => v.clone(),
        });
    }

    info!(
        "Loaded master file {} with {} rows and {} columns",
        file_name,
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::export::{export, ExportFormat};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sample() -> MasterTable {
        let dob = NaiveDate::from_ymd_opt(1987, 3, 1).unwrap();
        let now = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
        MasterTable::from_sheet(crate::models::sheet::Sheet::new(
            vec![
                "ID".into(),
                "Creation Time".into(),
                "First Name".into(),
                "Date of Birth".into(),
                "NI Number".into(),
                "Basic Annual Salary".into(),
                "Payroll Ref".into(),
            ],
            vec![
                vec![
                    Value::Integer(1),
                    Value::DateTime(now),
                    "Jane".into(),
                    Value::Date(dob),
                    "AB123456C".into(),
                    "30,000".into(),
                    "007".into(),
                ],
                vec![
                    Value::Integer(2),
                    Value::DateTime(now),
                    "Zoë".into(),
                    Value::Absent,
                    Value::Absent,
                    "  padded ".into(),
                    Value::Absent,
                ],
            ],
        ))
    }

    #[test]
    fn test_delimited_round_trip() {
        let original = sample();
        let payload = export(&original, ExportFormat::Delimited).unwrap();
        let loaded = load_master(&payload.bytes, "master.csv", OutputProfile::Hr).unwrap();
        assert_eq!(loaded.columns(), original.columns());
        assert_eq!(loaded.get(0, "Payroll Ref"), Some(&Value::from("007")));
        assert_eq!(loaded.get(0, "Basic Annual Salary"), Some(&Value::from("30,000")));
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_spreadsheet_round_trip() {
        let original = sample();
        let payload = export(&original, ExportFormat::Spreadsheet).unwrap();
        let loaded = load_master(&payload.bytes, "master.xlsx", OutputProfile::Hr).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_ids_and_dates_coerced() {
        let csv = b"ID,Date of Birth,Creation Time,Start Date\n7,1st March 1987,2025-01-02 03:04:05,someday\n";
        let table = load_master(csv, "master.csv", OutputProfile::Hr).unwrap();
        assert_eq!(table.get(0, "ID"), Some(&Value::Integer(7)));
        assert_eq!(
            table.get(0, "Date of Birth"),
            Some(&Value::Date(NaiveDate::from_ymd_opt(1987, 3, 1).unwrap()))
        );
        assert!(matches!(table.get(0, "Creation Time"), Some(Value::DateTime(_))));
        assert_eq!(table.get(0, "Start Date"), Some(&Value::from("someday")));
        assert_eq!(table.next_id(), 8);
    }

    #[test]
    fn test_empty_input() {
        let table = load_master(b"", "master.xlsx", OutputProfile::Hr).unwrap();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());

        let table = load_master(b"\n\n", "master.csv", OutputProfile::Hr).unwrap();
        assert!(table.columns().is_empty());
    }

    #[test]
    fn test_unsupported_master_kind() {
        let err = load_master(b"x", "master.docx", OutputProfile::Hr).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedKind(_)));
        let err = load_master(b"x", "master.xls", OutputProfile::Hr).unwrap_err();
        assert!(matches!(err, SourceError::UnsupportedKind(_)));
    }
}
