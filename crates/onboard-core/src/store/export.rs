//! Master table serialization.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::table::MasterTable;
use super::xlsx;
use crate::error::ExportError;

/// Output container for the master table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// XLSX workbook.
    #[default]
    Spreadsheet,
    /// Comma-separated text.
    Delimited,
    /// `{ "columns": [...], "rows": [[...]] }`.
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Spreadsheet => "xlsx",
            Self::Delimited => "csv",
            Self::Json => "json",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Spreadsheet => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Delimited => "text/csv",
            Self::Json => "application/json",
        }
    }

    /// Parse a format name or a file extension.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "spreadsheet" | "xlsx" => Some(Self::Spreadsheet),
            "delimited" | "csv" => Some(Self::Delimited),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Serialized table plus what a caller needs to store or serve it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

impl ExportPayload {
    /// `<stem>.<extension>`.
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension)
    }
}

/// Serialize `table` in `format`.
pub fn export(table: &MasterTable, format: ExportFormat) -> Result<ExportPayload, ExportError> {
    let bytes = match format {
        ExportFormat::Spreadsheet => xlsx::write_workbook(table)?,
        ExportFormat::Delimited => write_delimited(table)?,
        ExportFormat::Json => serde_json::to_vec_pretty(table)?,
    };

    info!(
        "Exported {} rows x {} columns as {} ({} bytes)",
        table.len(),
        table.columns().len(),
        format.extension(),
        bytes.len()
    );

    Ok(ExportPayload {
        bytes,
        content_type: format.content_type(),
        extension: format.extension(),
    })
}

fn write_delimited(table: &MasterTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|v| v.render().into_owned()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Delimited(e.into_error().into()))
}
