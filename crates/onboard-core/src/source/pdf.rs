//! PDF text lines via lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::Result;
use crate::error::SourceError;

/// Extract the text layer as trimmed, non-blank lines.
///
/// Documents encrypted with an empty user password are decrypted first;
/// anything else is rejected as [`SourceError::Encrypted`]. Scanned pages
/// without a text layer produce no lines.
pub fn read_lines(data: &[u8]) -> Result<Vec<String>> {
    let text = pdf_extract::extract_text_from_mem(&load_plain(data)?)
        .map_err(|e| SourceError::container("pdf", e))?;

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    debug!("Extracted {} lines from PDF", lines.len());
    Ok(lines)
}

/// Bytes pdf-extract can read: the input itself, or a decrypted copy.
fn load_plain(data: &[u8]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(data).map_err(|e| SourceError::container("pdf", e))?;

    if doc.get_pages().is_empty() {
        return Err(SourceError::MissingPart {
            kind: "pdf",
            part: "pages".to_string(),
        });
    }

    if !doc.is_encrypted() {
        return Ok(data.to_vec());
    }

    if doc.decrypt("").is_err() {
        return Err(SourceError::Encrypted);
    }
    debug!("Decrypted PDF with empty password");

    let mut decrypted = Vec::new();
    doc.save_to(&mut decrypted)
        .map_err(|e| SourceError::container("pdf", format!("failed to save decrypted PDF: {e}")))?;
    Ok(decrypted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_container_error() {
        let err = read_lines(b"%PDF-1.4 truncated").unwrap_err();
        assert!(matches!(err, SourceError::Container { kind: "pdf", .. }));
    }
}
