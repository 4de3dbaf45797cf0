//! End-to-end intake: detect, decode, extract, map, append.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extract::{LabelDictionary, LineExtractor, RowPolicy, TabularExtractor};
use crate::mapping::SchemaMapper;
use crate::models::record::RawFieldMap;
use crate::source::{self, SourceContent, SourceKind};
use crate::store::MasterTable;

/// Raw field maps pulled from one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub source: String,
    pub kind: SourceKind,
    pub records: Vec<RawFieldMap>,
    pub warnings: Vec<String>,
}

/// What one source contributed to the master table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    /// Identifiers of the appended rows, in append order.
    pub ids: Vec<i64>,
    pub warnings: Vec<String>,
}

/// What a batch does when a source fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next source.
    #[default]
    Continue,
    /// Record the failure and ingest nothing further.
    Stop,
}

/// Outcome of a batch. Failed sources are listed with their error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub reports: Vec<SourceReport>,
    pub failures: Vec<SourceFailure>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

impl BatchReport {
    /// Number of rows appended across all sources.
    pub fn appended(&self) -> usize {
        self.reports.iter().map(|r| r.ids.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(|r| r.warnings.len()).sum()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Label dictionary plus mapper configuration, applied to every source.
#[derive(Debug, Clone)]
pub struct IntakePipeline {
    dictionary: LabelDictionary,
    mapper: SchemaMapper,
}

impl Default for IntakePipeline {
    fn default() -> Self {
        Self::new(LabelDictionary::default(), SchemaMapper::default())
    }
}

impl IntakePipeline {
    pub fn new(dictionary: LabelDictionary, mapper: SchemaMapper) -> Self {
        Self { dictionary, mapper }
    }

    pub fn dictionary(&self) -> &LabelDictionary {
        &self.dictionary
    }

    pub fn mapper(&self) -> &SchemaMapper {
        &self.mapper
    }

    /// Extract raw field maps from one source.
    ///
    /// An unsupported kind is an error. A source that cannot be decoded yields
    /// one empty record and a warning, so a batch can move on.
    pub fn extract(&self, name: &str, data: &[u8]) -> Result<Extraction> {
        let kind = SourceKind::from_file_name(name)?;
        let mut warnings = Vec::new();

        let records = match source::decode(kind, data) {
            Ok(SourceContent::Lines(lines)) => {
                let raw = LineExtractor::new(&self.dictionary).extract(&lines);
                if raw.is_empty() {
                    warnings.push(format!("No labelled fields found in {name}"));
                }
                vec![raw]
            }
            Ok(SourceContent::Table(sheet)) => {
                let policy = match kind {
                    SourceKind::Delimited => RowPolicy::FirstRow,
                    _ => RowPolicy::EveryRow,
                };
                TabularExtractor::new(policy).extract(&sheet)
            }
            Err(e) => {
                warn!("Could not read {}: {}", name, e);
                warnings.push(format!("Could not read {name}: {e}"));
                vec![RawFieldMap::new()]
            }
        };

        debug!("{}: {} records from {} source", name, records.len(), kind.name());
        Ok(Extraction {
            source: name.to_string(),
            kind,
            records,
            warnings,
        })
    }

    /// Extract one source and append every record it holds.
    pub fn ingest(&self, table: &mut MasterTable, name: &str, data: &[u8]) -> Result<SourceReport> {
        let Extraction {
            kind,
            records,
            mut warnings,
            ..
        } = self.extract(name, data)?;

        let mut ids = Vec::with_capacity(records.len());
        for raw in &records {
            let (id, mapping_warnings) = table.append_raw(raw, &self.mapper, kind.shape());
            ids.push(id);
            warnings.extend(mapping_warnings.into_iter().map(|w| format!("{name}: {w}")));
        }

        info!("{}: appended {} rows", name, ids.len());
        Ok(SourceReport {
            source: name.to_string(),
            ids,
            warnings,
        })
    }

    /// Ingest sources in order. Each source's bytes arrive as a `Result` so a
    /// source that could not be read fails like one that could not be
    /// ingested. Failures are recorded; `policy` decides whether to go on.
    pub fn ingest_batch<I, N, D>(
        &self,
        table: &mut MasterTable,
        sources: I,
        policy: FailurePolicy,
    ) -> BatchReport
    where
        I: IntoIterator<Item = (N, Result<D>)>,
        N: AsRef<str>,
        D: AsRef<[u8]>,
    {
        let mut batch = BatchReport::default();
        for (name, data) in sources {
            let name = name.as_ref();
            match data.and_then(|data| self.ingest(table, name, data.as_ref())) {
                Ok(report) => batch.reports.push(report),
                Err(e) => {
                    warn!("Failed to process {}: {}", name, e);
                    batch.failures.push(SourceFailure {
                        source: name.to_string(),
                        error: e.to_string(),
                    });
                    if policy == FailurePolicy::Stop {
                        break;
                    }
                }
            }
        }

        info!(
            "Batch done: {} rows appended, {} sources failed",
            batch.appended(),
            batch.failures.len()
        );
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{OnboardError, SourceError};
    use crate::mapping::{OutputProfile, SurnameRule};
    use crate::models::value::Value;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        write!(
            zip,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        )
        .unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_form_to_row() {
        let data = docx(&[
            "New Starter Form",
            "Full Name: Jane Mary Doe",
            "Date of Birth",
            "1st March 1987",
            "Home Address: 1 High St, Flat 2, Leeds, West Yorks, LS1 1AA",
            "Job Title: Analyst",
        ]);
        let mut table = MasterTable::new();
        let report = IntakePipeline::default().ingest(&mut table, "jane.docx", &data).unwrap();

        assert_eq!(report.ids, vec![1]);
        assert!(report.warnings.is_empty());
        assert_eq!(table.get(0, "First Name"), Some(&Value::from("Jane")));
        assert_eq!(table.get(0, "Surname"), Some(&Value::from("Mary Doe")));
        assert_eq!(table.get(0, "Post Code"), Some(&Value::from("LS1 1AA")));
        assert_eq!(table.get(0, "Job Title"), Some(&Value::from("Analyst")));
        assert!(matches!(table.get(0, "Date of Birth"), Some(Value::Date(_))));
    }

    #[test]
    fn test_delimited_uses_first_row_only() {
        let csv = b"Full Name,Salary\nJane Doe,30000\nJohn Smith,25000\n";
        let extraction = IntakePipeline::default().extract("staff.csv", csv).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.kind, SourceKind::Delimited);
    }

    #[test]
    fn test_unsupported_kind_is_error() {
        let err = IntakePipeline::default().extract("photo.png", b"").unwrap_err();
        assert!(matches!(err, OnboardError::Source(SourceError::UnsupportedKind(_))));
    }

    #[test]
    fn test_decode_failure_yields_empty_record() {
        let mut table = MasterTable::new();
        let report = IntakePipeline::default()
            .ingest(&mut table, "broken.docx", b"not a zip")
            .unwrap();
        assert_eq!(report.ids, vec![1]);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0, "ID"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_malformed_delimited_yields_empty_record() {
        let extraction = IntakePipeline::default()
            .extract("staff.csv", b"Full Name\n\xff\xfe\n")
            .unwrap();
        assert_eq!(extraction.records, vec![RawFieldMap::new()]);
        assert!(extraction.warnings[0].starts_with("Could not read staff.csv"));
    }

    #[test]
    fn test_ragged_delimited_form_uses_first_row() {
        let extraction = IntakePipeline::default()
            .extract("staff.csv", b"Full Name,DOB\nJane Doe,01/03/1987\nJohn\n")
            .unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert!(extraction.warnings.is_empty());
        assert_eq!(extraction.records[0].get("Full Name"), Some(&Value::from("Jane Doe")));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let pipeline = IntakePipeline::new(
            LabelDictionary::default(),
            SchemaMapper::new(OutputProfile::Pension).with_surname_rule(SurnameRule::LastToken),
        );
        let mut table = MasterTable::new();
        let sources: Vec<(&str, Result<Vec<u8>>)> = vec![
            ("a.csv", Ok(b"Full Name,DOB\nJane Mary Doe,31/02/1990\n".to_vec())),
            ("b.xls", Ok(Vec::new())),
            ("c.docx", Ok(docx(&["Full Name: John Smith"]))),
        ];
        let batch = pipeline.ingest_batch(&mut table, sources, FailurePolicy::Continue);

        assert_eq!(batch.appended(), 2);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].source, "b.xls");
        assert_eq!(batch.warning_count(), 1);
        assert_eq!(table.get(0, "Surname"), Some(&Value::from("Doe")));
        assert_eq!(table.get(1, "Forename"), Some(&Value::from("John")));
        assert_eq!(table.get(1, "ID"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_batch_stops_at_first_failure() {
        let mut table = MasterTable::new();
        let sources: Vec<(&str, Result<&[u8]>)> = vec![
            ("a.csv", Ok(&b"Full Name\nJane Doe\n"[..])),
            ("missing.csv", Err(std::io::Error::from(std::io::ErrorKind::NotFound).into())),
            ("c.csv", Ok(&b"Full Name\nJohn Smith\n"[..])),
        ];
        let batch = IntakePipeline::default().ingest_batch(&mut table, sources, FailurePolicy::Stop);

        assert_eq!(batch.appended(), 1);
        assert!(batch.has_failures());
        assert_eq!(batch.failures[0].source, "missing.csv");
        assert_eq!(table.len(), 1);
    }
}
