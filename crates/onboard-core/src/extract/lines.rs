//! Label-anchored extraction from line-oriented text (DOCX paragraphs, PDF lines).

use tracing::{debug, trace};

use super::labels::LabelDictionary;
use crate::models::record::RawFieldMap;

/// Scans lines for dictionary labels.
///
/// A line that starts with a label yields the rest of the line as the value.
/// A line that holds only the label takes the following line as the value.
pub struct LineExtractor<'a> {
    dictionary: &'a LabelDictionary,
}

impl<'a> LineExtractor<'a> {
    pub fn new(dictionary: &'a LabelDictionary) -> Self {
        Self { dictionary }
    }

    /// Extract a raw field map from ordered, non-blank lines.
    ///
    /// Lines are trimmed and blank lines dropped here as well, so callers can
    /// pass decoder output directly.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> RawFieldMap {
        let lines: Vec<&str> = lines
            .iter()
            .map(|l| l.as_ref().trim())
            .filter(|l| !l.is_empty())
            .collect();

        let mut data = RawFieldMap::new();

        for (i, line) in lines.iter().enumerate() {
            for entry in self.dictionary.entries() {
                let Some(rest) = strip_prefix_ignore_case(line, &entry.label) else {
                    continue;
                };

                let value = rest.trim_matches(|c: char| c == ':' || c.is_whitespace());
                if !value.is_empty() {
                    trace!("label {:?} on same line: {:?}", entry.label, value);
                    data.insert(entry.field.as_str(), value);
                    break;
                }

                if is_bare_label(line, &entry.label) {
                    if let Some(next) = lines.get(i + 1) {
                        trace!("label {:?} alone, value on next line: {:?}", entry.label, next);
                        data.insert(entry.field.as_str(), next.trim());
                    }
                    break;
                }
            }
        }

        debug!("Extracted {} fields from {} lines", data.len(), lines.len());
        data
    }
}

/// Case-insensitive prefix strip that never splits a UTF-8 character.
fn strip_prefix_ignore_case<'l>(line: &'l str, label: &str) -> Option<&'l str> {
    let head = line.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        line.get(label.len()..)
    } else {
        None
    }
}

/// The line is just the label, optionally followed by colons.
fn is_bare_label(line: &str, label: &str) -> bool {
    line.trim()
        .trim_end_matches(':')
        .trim_end()
        .eq_ignore_ascii_case(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::labels::field;
    use crate::models::value::Value;
    use pretty_assertions::assert_eq;

    fn extract(lines: &[&str]) -> RawFieldMap {
        let dict = LabelDictionary::new();
        LineExtractor::new(&dict).extract(lines)
    }

    #[test]
    fn test_same_line() {
        let data = extract(&["Job Title: Pilot"]);
        let expected: RawFieldMap = [(field::JOB_TITLE, "Pilot")].into_iter().collect();
        assert_eq!(data, expected);
    }

    #[test]
    fn test_next_line_fallback() {
        assert_eq!(extract(&["Job Title", "Pilot"]), extract(&["Job Title: Pilot"]));
        assert_eq!(extract(&["Job Title:", "Pilot"]), extract(&["Job Title: Pilot"]));
    }

    #[test]
    fn test_no_match() {
        assert!(extract(&["Welcome to the company!"]).is_empty());
    }

    #[test]
    fn test_case_insensitive_label() {
        let data = extract(&["DATE OF BIRTH - 01/03/1987"]);
        assert_eq!(data.get(field::DATE_OF_BIRTH), Some(&Value::from("- 01/03/1987")));
    }

    #[test]
    fn test_synonym_label() {
        let data = extract(&["National Insurance No. QQ123456C"]);
        assert_eq!(data.get(field::NI_NUMBER), Some(&Value::from("QQ123456C")));
    }

    #[test]
    fn test_more_specific_label_wins() {
        let data = extract(&["Telephone Number of Emergency Contact: 07700 900123"]);
        assert_eq!(
            data.get(field::EMERGENCY_CONTACT_NUMBER),
            Some(&Value::from("07700 900123"))
        );
        assert!(!data.contains(field::TELEPHONE));
    }

    #[test]
    fn test_later_occurrence_overwrites() {
        let data = extract(&["Job Title: Pilot", "Notes: promoted", "Job Title: Captain"]);
        assert_eq!(data.get(field::JOB_TITLE), Some(&Value::from("Captain")));
    }

    #[test]
    fn test_label_at_end_without_value() {
        let data = extract(&["Notes"]);
        assert!(data.is_empty());
    }

    #[test]
    fn test_label_with_trailing_text_not_bare() {
        // "Title" matches as a prefix but the remainder is a value, not a bare label.
        let data = extract(&["Title Mr", "Full Name", "Jane Mary Doe"]);
        assert_eq!(data.get(field::TITLE), Some(&Value::from("Mr")));
        assert_eq!(data.get(field::FULL_NAME), Some(&Value::from("Jane Mary Doe")));
    }

    #[test]
    fn test_multiline_paragraph_value() {
        let data = extract(&["Home Address", "10 High St\nLondon\nSW1A 1AA"]);
        assert_eq!(
            data.get(field::HOME_ADDRESS),
            Some(&Value::from("10 High St\nLondon\nSW1A 1AA"))
        );
    }
}
