//! First worksheet of an XLSX workbook as a sheet.
//!
//! Only the parts needed for values are read: shared strings, cell styles
//! (to tell date serials from plain numbers) and the worksheet itself.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tracing::{debug, trace};

use super::{open_zip, read_zip_entry, text_cell, Result};
use crate::error::SourceError;
use crate::models::sheet::Sheet;
use crate::models::value::Value;

const KIND: &str = "xlsx";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
const STYLES_PART: &str = "xl/styles.xml";
const FIRST_SHEET_PART: &str = "xl/worksheets/sheet1.xml";
/// Columns `A` to `XFD`.
const MAX_COLUMNS: usize = 16_384;

/// Read the first worksheet. The first row is the header.
pub fn read_sheet(data: &[u8]) -> Result<Sheet> {
    let mut archive = open_zip(KIND, data)?;

    let shared = match read_zip_entry(&mut archive, KIND, SHARED_STRINGS_PART)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };
    let date_styles = match read_zip_entry(&mut archive, KIND, STYLES_PART)? {
        Some(xml) => parse_date_styles(&xml)?,
        None => Vec::new(),
    };

    let sheet_part = if archive.index_for_name(FIRST_SHEET_PART).is_some() {
        FIRST_SHEET_PART.to_string()
    } else {
        let mut parts: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with("xl/worksheets/") && name.ends_with(".xml"))
            .map(String::from)
            .collect();
        parts.sort();
        parts.into_iter().next().ok_or_else(|| SourceError::MissingPart {
            kind: KIND,
            part: "worksheet".to_string(),
        })?
    };
    trace!("Reading worksheet {}", sheet_part);

    let xml = read_zip_entry(&mut archive, KIND, &sheet_part)?.ok_or_else(|| {
        SourceError::MissingPart {
            kind: KIND,
            part: sheet_part.clone(),
        }
    })?;
    let mut grid = parse_worksheet(&xml, &shared, &date_styles)?.into_iter();

    let headers = grid
        .next()
        .map(|row| row.iter().map(|v| v.render().trim().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Value>> = grid.collect();

    debug!("Read worksheet with {} rows", rows.len());
    Ok(Sheet::new(headers, rows))
}

/// Convert a spreadsheet serial (days since 1899-12-30) to a timestamp,
/// rounded to the second.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.floor();
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    base.checked_add_signed(TimeDelta::try_days(days as i64)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

fn xml_error(e: impl std::fmt::Display) -> SourceError {
    SourceError::container(KIND, e)
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value().map_err(xml_error)?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Phonetic runs carry reading hints, not cell text.
    let mut in_phonetic = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Text(t)) if in_text && !in_phonetic => {
                current.push_str(&t.unescape().map_err(xml_error)?);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(strings)
}

/// One flag per cell format index: does it display a date.
fn parse_date_styles(xml: &str) -> Result<Vec<bool>> {
    let mut reader = Reader::from_str(xml);
    let mut custom: HashMap<u32, bool> = HashMap::new();
    let mut styles = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        let (e, is_start) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, true),
            Ok(Event::Empty(e)) => (e, false),
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => continue,
        };

        match e.local_name().as_ref() {
            b"numFmt" => {
                let id = attribute(&e, b"numFmtId")?.and_then(|v| v.parse().ok());
                let code = attribute(&e, b"formatCode")?.unwrap_or_default();
                if let Some(id) = id {
                    custom.insert(id, is_date_format_code(&code));
                }
            }
            b"cellXfs" if is_start => in_cell_xfs = true,
            b"xf" if in_cell_xfs => {
                let id: u32 = attribute(&e, b"numFmtId")?
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                let is_date = custom
                    .get(&id)
                    .copied()
                    .unwrap_or_else(|| is_builtin_date_format(id));
                styles.push(is_date);
            }
            _ => {}
        }
    }

    Ok(styles)
}

fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 45..=47)
}

/// A custom number format shows a date when it uses day or year tokens
/// outside quoted literals and bracketed sections.
fn is_date_format_code(code: &str) -> bool {
    let mut in_quotes = false;
    let mut in_brackets = false;
    for c in code.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            'd' | 'D' | 'y' | 'Y' if !in_quotes && !in_brackets => return true,
            _ => {}
        }
    }
    false
}

/// Column index from a cell reference such as `C7`. `None` when the
/// reference has no column letters; a column past `XFD` is an error.
fn column_index(reference: &str) -> Result<Option<usize>> {
    let mut letters = reference.chars().take_while(char::is_ascii_alphabetic).peekable();
    if letters.peek().is_none() {
        return Ok(None);
    }

    let index = letters.try_fold(0usize, |index, c| {
        index
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)
    });
    match index {
        Some(index) if index <= MAX_COLUMNS => Ok(Some(index - 1)),
        _ => Err(SourceError::container(
            KIND,
            format!("cell reference {reference} is past the last column"),
        )),
    }
}

struct PendingCell {
    column: usize,
    kind: Option<String>,
    style: Option<usize>,
    text: String,
}

impl PendingCell {
    fn into_value(self, shared: &[String], date_styles: &[bool]) -> Value {
        let raw = self.text.as_str();
        match self.kind.as_deref() {
            Some("s") => raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| shared.get(i))
                .map_or(Value::Absent, |s| text_cell(s)),
            Some("str") | Some("inlineStr") => text_cell(raw),
            Some("b") => Value::Bool(raw.trim() == "1"),
            Some("e") => Value::Absent,
            Some("d") => crate::extract::parse_timestamp(raw).map_or_else(|| text_cell(raw), Value::DateTime),
            _ => {
                let Ok(number) = raw.trim().parse::<f64>() else {
                    return text_cell(raw);
                };
                let is_date = self
                    .style
                    .and_then(|s| date_styles.get(s))
                    .copied()
                    .unwrap_or(false);
                if is_date {
                    serial_to_datetime(number).map_or(Value::Number(number), Value::DateTime)
                } else {
                    Value::Number(number)
                }
            }
        }
    }
}

fn parse_worksheet(xml: &str, shared: &[String], date_styles: &[bool]) -> Result<Vec<Vec<Value>>> {
    let mut reader = Reader::from_str(xml);
    let mut grid: Vec<Vec<Value>> = Vec::new();
    let mut row: Vec<Value> = Vec::new();
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => row = Vec::new(),
                b"c" => {
                    let column = match attribute(&e, b"r")? {
                        Some(reference) => column_index(&reference)?,
                        None => None,
                    }
                    .unwrap_or(row.len());
                    cell = Some(PendingCell {
                        column,
                        kind: attribute(&e, b"t")?,
                        style: attribute(&e, b"s")?.and_then(|s| s.parse().ok()),
                        text: String::new(),
                    });
                }
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Ok(Event::Text(t)) if in_value => {
                if let Some(cell) = cell.as_mut() {
                    cell.text.push_str(&t.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(pending) = cell.take() {
                        let column = pending.column;
                        if row.len() <= column {
                            row.resize(column + 1, Value::Absent);
                        }
                        row[column] = pending.into_value(shared, date_styles);
                    }
                }
                b"row" => grid.push(std::mem::take(&mut row)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
    }

    Ok(grid)
}
