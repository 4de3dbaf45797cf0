//! Common regex patterns for field extraction and date repair.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Day ordinals: "1st", "22nd", "3rd", "14TH"
    pub static ref ORDINAL_SUFFIX: Regex = Regex::new(
        r"(?i)\b(\d+)(?:st|nd|rd|th)\b"
    ).unwrap();

    // "01/031987" - month and year run together
    pub static ref MISSING_YEAR_SEPARATOR: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})(\d{4})$"
    ).unwrap();

    // Text rendering of a timestamp object: Timestamp('1987-03-01 00:00:00')
    pub static ref TIMESTAMP_WRAPPER: Regex = Regex::new(
        r#"^Timestamp\(\s*['"]([^'"]*)['"]\s*\)$"#
    ).unwrap();

    // Runs of whitespace and commas between date parts
    pub static ref DATE_FILLER: Regex = Regex::new(
        r"[\s,]+"
    ).unwrap();
}
