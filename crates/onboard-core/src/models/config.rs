//! Configuration structures for the intake pipeline.

use serde::{Deserialize, Serialize};

use crate::extract::{LabelDictionary, LabelEntry};
use crate::mapping::{OutputProfile, SchemaMapper, SurnameRule};
use crate::pipeline::IntakePipeline;
use crate::store::ExportFormat;

/// Main configuration for the onboard pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnboardConfig {
    /// Label extraction configuration.
    pub extraction: ExtractionConfig,

    /// Schema mapping configuration.
    pub mapping: MappingConfig,

    /// Master file output configuration.
    pub export: ExportConfig,
}

/// Label extraction configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Additional form labels, tried after the built-in ones.
    pub extra_labels: Vec<LabelEntry>,
}

/// Schema mapping configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Column layout of appended rows.
    pub profile: OutputProfile,

    /// Name-splitting rule; the profile's default when unset.
    pub surname_rule: Option<SurnameRule>,
}

/// Master file output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Container written by `append`.
    pub format: ExportFormat,

    /// Output file name without extension.
    pub file_stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Spreadsheet,
            file_stem: "Updated_Master_File".to_string(),
        }
    }
}

impl OnboardConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Built-in labels followed by the configured extras.
    pub fn dictionary(&self) -> LabelDictionary {
        LabelDictionary::new().with_entries(self.extraction.extra_labels.iter().cloned())
    }

    pub fn mapper(&self) -> SchemaMapper {
        let mapper = SchemaMapper::new(self.mapping.profile);
        match self.mapping.surname_rule {
            Some(rule) => mapper.with_surname_rule(rule),
            None => mapper,
        }
    }

    pub fn pipeline(&self) -> IntakePipeline {
        IntakePipeline::new(self.dictionary(), self.mapper())
    }
}
