//! Field extraction: label dictionary, line and row extractors, date repair.

pub mod dates;
pub mod labels;
pub mod lines;
pub mod patterns;
pub mod tabular;

pub use dates::{normalize_date, normalize_date_text, parse_timestamp, repair_date_text};
pub use labels::{LabelDictionary, LabelEntry};
pub use lines::LineExtractor;
pub use tabular::{RowPolicy, TabularExtractor};
