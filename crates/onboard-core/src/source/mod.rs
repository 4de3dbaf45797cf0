//! Source detection and container decoding.
//!
//! Decoders turn raw bytes into either ordered text lines (DOCX, PDF) or a
//! header-plus-rows sheet (CSV, XLSX). Nothing past this boundary sees bytes.

pub mod delimited;
pub mod docx;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod xlsx;

use std::io::{Cursor, Read};
use std::path::Path;

use serde::Serialize;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::SourceError;
use crate::mapping::SourceShape;
use crate::models::sheet::Sheet;
use crate::models::value::Value;

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// Kind of source document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Word-processing document (.docx).
    Docx,
    /// Portable document (.pdf).
    Pdf,
    /// Delimited text (.csv, .txt).
    Delimited,
    /// Spreadsheet workbook (.xlsx).
    Spreadsheet,
}

/// Decoded content of one source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceContent {
    /// Ordered, trimmed, non-blank lines.
    Lines(Vec<String>),
    /// Header row plus data rows.
    Table(Sheet),
}

impl SourceKind {
    /// Detect the kind from a file name or path.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "docx" => Ok(Self::Docx),
            "pdf" => Ok(Self::Pdf),
            "csv" | "txt" => Ok(Self::Delimited),
            "xlsx" => Ok(Self::Spreadsheet),
            "xls" => Err(SourceError::UnsupportedKind(
                "xls (legacy binary workbook, save as .xlsx)".to_string(),
            )),
            "" => Err(SourceError::UnsupportedKind(format!("{name} (no extension)"))),
            other => Err(SourceError::UnsupportedKind(other.to_string())),
        }
    }

    /// Which synonym table the extracted fields are resolved with.
    pub fn shape(self) -> SourceShape {
        match self {
            Self::Docx | Self::Pdf => SourceShape::FreeText,
            Self::Delimited | Self::Spreadsheet => SourceShape::Tabular,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Delimited => "delimited",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// Decode source bytes of a known kind.
pub fn decode(kind: SourceKind, data: &[u8]) -> Result<SourceContent> {
    match kind {
        SourceKind::Docx => docx::read_paragraphs(data).map(SourceContent::Lines),
        #[cfg(feature = "pdf")]
        SourceKind::Pdf => pdf::read_lines(data).map(SourceContent::Lines),
        #[cfg(not(feature = "pdf"))]
        SourceKind::Pdf => Err(SourceError::UnsupportedKind(
            "pdf (built without the `pdf` feature)".to_string(),
        )),
        SourceKind::Delimited => delimited::read_form(data).map(SourceContent::Table),
        SourceKind::Spreadsheet => xlsx::read_sheet(data).map(SourceContent::Table),
    }
}

/// Text cell: empty becomes `Absent`, anything else is kept verbatim.
pub(crate) fn text_cell(s: &str) -> Value {
    if s.is_empty() {
        Value::Absent
    } else {
        Value::Text(s.to_string())
    }
}

pub(crate) fn open_zip<'a>(kind: &'static str, data: &'a [u8]) -> Result<ZipArchive<Cursor<&'a [u8]>>> {
    ZipArchive::new(Cursor::new(data)).map_err(|e| SourceError::container(kind, e))
}

/// Read a zip entry as UTF-8, `None` if the entry does not exist.
pub(crate) fn read_zip_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    kind: &'static str,
    name: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(SourceError::container(kind, e)),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| SourceError::container(kind, e))?;
    Ok(Some(content))
}
