//! Error types for the onboard-core library.

use thiserror::Error;

/// Main error type for the onboard library.
#[derive(Error, Debug)]
pub enum OnboardError {
    /// Source detection or decoding error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Master table export error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning source bytes into lines or rows.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file extension is not one we know how to decode.
    #[error("unsupported source kind: {0}")]
    UnsupportedKind(String),

    /// The container (zip, XML, PDF) could not be opened.
    #[error("failed to open {kind} container: {reason}")]
    Container { kind: &'static str, reason: String },

    /// A required part of the container is missing.
    #[error("{kind} container has no {part}")]
    MissingPart { kind: &'static str, part: String },

    /// Delimited text could not be parsed as rows.
    #[error("failed to parse delimited text: {0}")]
    Delimited(#[from] csv::Error),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,
}

/// Errors raised while serializing the master table.
#[derive(Error, Debug)]
pub enum ExportError {
    /// CSV writer failure.
    #[error("failed to write delimited text: {0}")]
    Delimited(#[from] csv::Error),

    /// Spreadsheet container failure.
    #[error("failed to write spreadsheet: {0}")]
    Spreadsheet(String),

    /// JSON serialization failure.
    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SourceError {
    pub(crate) fn container(kind: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Container {
            kind,
            reason: reason.to_string(),
        }
    }
}

/// Result type for the onboard library.
pub type Result<T> = std::result::Result<T, OnboardError>;
