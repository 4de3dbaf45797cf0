//! DOCX paragraphs from `word/document.xml`.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use super::{open_zip, read_zip_entry, Result};
use crate::error::SourceError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph texts in document order, trimmed, blanks dropped.
///
/// Paragraphs inside tables are included. Tabs become `\t` and manual line
/// breaks become `\n`, so a paragraph can hold more than one line.
pub fn read_paragraphs(data: &[u8]) -> Result<Vec<String>> {
    let mut archive = open_zip("docx", data)?;
    let xml = read_zip_entry(&mut archive, "docx", DOCUMENT_PART)?.ok_or_else(|| {
        SourceError::MissingPart {
            kind: "docx",
            part: DOCUMENT_PART.to_string(),
        }
    })?;

    let paragraphs = parse_document(&xml)?;
    debug!("Read {} paragraphs from DOCX", paragraphs.len());
    Ok(paragraphs)
}

fn parse_document(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    // Text boxes nest paragraphs inside paragraphs.
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if let Some(current) = open.last_mut() {
                    match e.local_name().as_ref() {
                        b"tab" => current.push('\t'),
                        b"br" | b"cr" => current.push('\n'),
                        _ => {}
                    }
                }
            }
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| SourceError::container("docx", e))?;
                if let Some(current) = open.last_mut() {
                    current.push_str(&text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(paragraph) = open.pop() {
                        let trimmed = paragraph.trim();
                        if !trimmed.is_empty() {
                            paragraphs.push(trimmed.to_string());
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::container("docx", e)),
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx(body: &str) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DOCUMENT_PART, SimpleFileOptions::default()).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraph_runs_joined() {
        let data = docx(
            "<w:p><w:r><w:t>Full Name: </w:t></w:r><w:r><w:t>Jane Doe</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t xml:space=\"preserve\">  Title  </w:t></w:r></w:p>",
        );
        assert_eq!(read_paragraphs(&data).unwrap(), vec!["Full Name: Jane Doe", "Title"]);
    }

    #[test]
    fn test_table_cells_included() {
        let data = docx(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>NI Number</w:t></w:r></w:p></w:tc>\
             <w:tc><w:p><w:r><w:t>AB123456C</w:t></w:r></w:p></w:tc></w:tr></w:tbl>",
        );
        assert_eq!(read_paragraphs(&data).unwrap(), vec!["NI Number", "AB123456C"]);
    }

    #[test]
    fn test_breaks_and_entities() {
        let data = docx(
            "<w:p><w:r><w:t>Home Address:</w:t><w:br/><w:t>1 High St &amp; Co</w:t></w:r></w:p>",
        );
        assert_eq!(read_paragraphs(&data).unwrap(), vec!["Home Address:\n1 High St & Co"]);
    }

    #[test]
    fn test_missing_document_part() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
        let data = zip.finish().unwrap().into_inner();

        let err = read_paragraphs(&data).unwrap_err();
        assert!(matches!(err, SourceError::MissingPart { kind: "docx", .. }));
    }
}
