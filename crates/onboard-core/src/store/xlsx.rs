//! Minimal single-sheet XLSX writer.

use std::io::{Cursor, Write};

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::table::MasterTable;
use crate::error::ExportError;
use crate::models::value::Value;

type Result<T> = std::result::Result<T, ExportError>;

/// Display format applied to every date and date-time cell.
pub const DATE_TIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Cell format index of [`DATE_TIME_FORMAT`] in the styles part.
const DATE_STYLE: &str = "1";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd hh:mm:ss"/></numFmts><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Serialize the table as a workbook with one sheet, header row first.
pub fn write_workbook(table: &MasterTable) -> Result<Vec<u8>> {
    let sheet = write_worksheet(table)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", WORKBOOK.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/styles.xml", STYLES.as_bytes()),
        ("xl/worksheets/sheet1.xml", sheet.as_slice()),
    ] {
        zip.start_file(name, options).map_err(spreadsheet_error)?;
        zip.write_all(content).map_err(spreadsheet_error)?;
    }

    let cursor = zip.finish().map_err(spreadsheet_error)?;
    Ok(cursor.into_inner())
}

/// Days since 1899-12-30, fractional part for the time of day.
pub fn datetime_to_serial(dt: NaiveDateTime) -> f64 {
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (dt - base).num_seconds() as f64 / 86_400.0
}

/// `A`, `B`, ..., `Z`, `AA`, ... for a zero-based column index.
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

fn spreadsheet_error(e: impl std::fmt::Display) -> ExportError {
    ExportError::Spreadsheet(e.to_string())
}

struct SheetWriter {
    xml: Writer<Vec<u8>>,
}

impl SheetWriter {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.xml.write_event(event).map_err(spreadsheet_error)
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(element))
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> Result<()> {
        self.event(Event::Text(BytesText::new(text)))
    }

    fn inline_string(&mut self, reference: &str, text: &str) -> Result<()> {
        self.start("c", &[("r", reference), ("t", "inlineStr")])?;
        self.start("is", &[])?;
        self.start("t", &[("xml:space", "preserve")])?;
        self.text(text)?;
        self.end("t")?;
        self.end("is")?;
        self.end("c")
    }

    fn value_cell(&mut self, attributes: &[(&str, &str)], value: &str) -> Result<()> {
        self.start("c", attributes)?;
        self.start("v", &[])?;
        self.text(value)?;
        self.end("v")?;
        self.end("c")
    }

    fn cell(&mut self, reference: &str, value: &Value) -> Result<()> {
        match value {
            Value::Absent => Ok(()),
            Value::Text(s) => self.inline_string(reference, s),
            Value::Integer(n) => self.value_cell(&[("r", reference)], &n.to_string()),
            Value::Number(n) if n.is_finite() => self.value_cell(&[("r", reference)], &n.to_string()),
            Value::Number(_) => self.inline_string(reference, &value.render()),
            Value::Bool(b) => {
                self.value_cell(&[("r", reference), ("t", "b")], if *b { "1" } else { "0" })
            }
            Value::Date(d) => {
                let serial = d.and_hms_opt(0, 0, 0).map(datetime_to_serial).unwrap_or_default();
                self.value_cell(&[("r", reference), ("s", DATE_STYLE)], &serial.to_string())
            }
            Value::DateTime(dt) => {
                let serial = datetime_to_serial(*dt);
                self.value_cell(&[("r", reference), ("s", DATE_STYLE)], &serial.to_string())
            }
        }
    }
}

fn write_worksheet(table: &MasterTable) -> Result<Vec<u8>> {
    let mut out = SheetWriter {
        xml: Writer::new(Vec::new()),
    };
    out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    out.start(
        "worksheet",
        &[("xmlns", "http://schemas.openxmlformats.org/spreadsheetml/2006/main")],
    )?;
    out.start("sheetData", &[])?;

    let letters: Vec<String> = (0..table.columns().len()).map(column_letters).collect();

    out.start("row", &[("r", "1")])?;
    for (column, letter) in table.columns().iter().zip(&letters) {
        out.inline_string(&format!("{letter}1"), column)?;
    }
    out.end("row")?;

    for (i, row) in table.rows().iter().enumerate() {
        let number = (i + 2).to_string();
        out.start("row", &[("r", number.as_str())])?;
        for (value, letter) in row.iter().zip(&letters) {
            out.cell(&format!("{letter}{number}"), value)?;
        }
        out.end("row")?;
    }

    out.end("sheetData")?;
    out.end("worksheet")?;
    Ok(out.xml.into_inner())
}
