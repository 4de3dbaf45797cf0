//! Core library for employee onboarding intake.
//!
//! This crate provides:
//! - Source decoding (DOCX paragraphs, PDF text, CSV and XLSX sheets)
//! - Label-anchored field extraction with tolerant date repair
//! - Schema mapping into the `hr` and `pension` output profiles
//! - An append-only master table with XLSX, CSV and JSON export

pub mod error;
pub mod extract;
pub mod mapping;
pub mod models;
pub mod pipeline;
pub mod source;
pub mod store;

pub use error::{ExportError, OnboardError, Result, SourceError};
pub use extract::{LabelDictionary, LabelEntry, LineExtractor, RowPolicy, TabularExtractor};
pub use mapping::{MappingResult, OutputProfile, SchemaMapper, SourceShape, SurnameRule};
pub use models::{CanonicalRecord, OnboardConfig, RawFieldMap, Sheet, Value};
pub use pipeline::{BatchReport, Extraction, FailurePolicy, IntakePipeline, SourceFailure, SourceReport};
pub use source::{SourceContent, SourceKind};
pub use store::{export, load_master, ExportFormat, ExportPayload, MasterTable};
