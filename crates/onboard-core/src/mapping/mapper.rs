//! Schema mapper: raw field maps to profile-shaped canonical records.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::fields::{OutputField, OutputProfile, SurnameRule};
use super::synonyms::{first_present, SynonymTable, FREE_TEXT, TABULAR};
use crate::extract::dates::normalize_date;
use crate::models::record::{CanonicalRecord, RawFieldMap};
use crate::models::value::Value;

/// Where a raw field map came from, which selects the synonym table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceShape {
    /// Label-extracted text (DOCX, PDF).
    FreeText,
    /// Column-named rows (CSV, spreadsheets).
    Tabular,
}

/// Result of mapping one raw field map.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingResult {
    /// Schema-complete record for the mapper's profile.
    pub record: CanonicalRecord,
    /// Normalization problems, e.g. unparseable dates.
    pub warnings: Vec<String>,
}

/// Maps raw field maps into one output profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaMapper {
    profile: OutputProfile,
    surname_rule: SurnameRule,
}

impl SchemaMapper {
    /// Mapper for a profile, using the profile's default surname rule.
    pub fn new(profile: OutputProfile) -> Self {
        Self {
            profile,
            surname_rule: profile.default_surname_rule(),
        }
    }

    /// Override how full names are split.
    pub fn with_surname_rule(mut self, rule: SurnameRule) -> Self {
        self.surname_rule = rule;
        self
    }

    pub fn profile(&self) -> OutputProfile {
        self.profile
    }

    pub fn surname_rule(&self) -> SurnameRule {
        self.surname_rule
    }

    /// Map using the synonym table for `shape`. Pure: same input, same output.
    pub fn map(&self, raw: &RawFieldMap, shape: SourceShape) -> MappingResult {
        let table = match shape {
            SourceShape::FreeText => &FREE_TEXT,
            SourceShape::Tabular => &TABULAR,
        };
        self.map_with(raw, table)
    }

    pub fn map_free_text(&self, raw: &RawFieldMap) -> MappingResult {
        self.map(raw, SourceShape::FreeText)
    }

    pub fn map_tabular(&self, raw: &RawFieldMap) -> MappingResult {
        self.map(raw, SourceShape::Tabular)
    }

    fn map_with(&self, raw: &RawFieldMap, table: &SynonymTable) -> MappingResult {
        let mut warnings = Vec::new();
        let mut values: BTreeMap<OutputField, Value> = BTreeMap::new();

        for (target, keys) in table.direct {
            if let Some(value) = first_present(raw, keys) {
                values.insert(*target, clean(value));
            }
        }

        self.resolve_name(raw, table, &mut values);
        resolve_address(raw, table, &mut values);

        for (target, value) in values.iter_mut() {
            if !target.is_date() || value.is_absent() {
                continue;
            }
            match normalize_date(value) {
                Some(date) => *value = Value::Date(date),
                None => {
                    let column = self.profile.column_for(*target).unwrap_or("date");
                    warn!("Could not parse {}: {:?}", column, value.render());
                    warnings.push(format!("Could not parse {}: {:?}", column, value.render()));
                    *value = Value::Absent;
                }
            }
        }

        let columns = self
            .profile
            .columns()
            .iter()
            .map(|(target, column)| {
                let value = values.remove(target).unwrap_or_default();
                ((*column).to_string(), value)
            })
            .collect();

        let record = CanonicalRecord::from_columns(columns);
        debug!(
            "Mapped {} raw fields into {} {:?} columns",
            raw.len(),
            record.len(),
            self.profile
        );

        MappingResult { record, warnings }
    }

    fn resolve_name(
        &self,
        raw: &RawFieldMap,
        table: &SynonymTable,
        values: &mut BTreeMap<OutputField, Value>,
    ) {
        if values.contains_key(&OutputField::FirstName) {
            return;
        }
        let Some(full_name) = first_present(raw, table.full_name) else {
            return;
        };

        let (first, surname) = split_full_name(&full_name.render(), self.surname_rule);
        values.insert(OutputField::FirstName, first.into());
        values
            .entry(OutputField::Surname)
            .or_insert_with(|| surname.into());
    }
}

impl Default for SchemaMapper {
    fn default() -> Self {
        Self::new(OutputProfile::default())
    }
}

/// Trim text values; other scalars pass through.
fn clean(value: &Value) -> Value {
    match value {
        Value::Text(s) => Value::text_or_absent(s),
        other => other.clone(),
    }
}

fn resolve_address(raw: &RawFieldMap, table: &SynonymTable, values: &mut BTreeMap<OutputField, Value>) {
    let has_lines = OutputField::ADDRESS_LINES
        .iter()
        .any(|line| values.contains_key(line));
    if has_lines {
        return;
    }
    let Some(address) = first_present(raw, table.address) else {
        return;
    };

    let segments = split_address(&address.render());
    for (line, segment) in OutputField::ADDRESS_LINES.iter().zip(segments.lines) {
        values.insert(*line, segment.into());
    }
    if let Some(postcode) = segments.postcode {
        values.entry(OutputField::Postcode).or_insert(Value::Text(postcode));
    }
}

/// Split a full name into first name and surname.
///
/// The first whitespace token is the first name. With a single token the
/// surname is `None`.
pub fn split_full_name(full_name: &str, rule: SurnameRule) -> (Option<String>, Option<String>) {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    let Some((first, rest)) = tokens.split_first() else {
        return (None, None);
    };

    let surname = match (rule, rest) {
        (_, []) => None,
        (SurnameRule::RemainingTokens, rest) => Some(rest.join(" ")),
        (SurnameRule::LastToken, rest) => rest.last().map(|s| s.to_string()),
    };

    (Some(first.to_string()), surname)
}

/// Positional address lines and postcode cut from one address string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSegments {
    pub lines: [Option<String>; 4],
    pub postcode: Option<String>,
}

/// Segment an address on newlines, or on commas when it is a single line.
///
/// The first four segments become address lines. The last segment is the
/// postcode only when there are at least five segments.
pub fn split_address(address: &str) -> AddressSegments {
    let mut parts: Vec<&str> = address
        .lines()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() == 1 {
        parts = address
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
    }

    let mut segments = AddressSegments::default();
    for (slot, part) in segments.lines.iter_mut().zip(&parts) {
        *slot = Some((*part).to_string());
    }
    if parts.len() >= 5 {
        segments.postcode = parts.last().map(|p| (*p).to_string());
    }
    segments
}
