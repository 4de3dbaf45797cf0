//! Label dictionary: printed form labels and the canonical fields they name.

use serde::{Deserialize, Serialize};

/// Canonical field names produced by the built-in label table.
pub mod field {
    pub const TITLE: &str = "Title";
    pub const FULL_NAME: &str = "Full Name";
    pub const HOME_ADDRESS: &str = "Home Address";
    pub const HOME_TELEPHONE: &str = "Home Telephone Number";
    pub const MOBILE_TELEPHONE: &str = "Mobile Telephone Number";
    pub const TELEPHONE: &str = "Telephone Number";
    pub const PERSONAL_EMAIL: &str = "Personal Email Address";
    pub const DATE_OF_BIRTH: &str = "Date of Birth";
    pub const PRONOUNS: &str = "Pronouns";
    pub const NI_NUMBER: &str = "National Insurance Number";
    pub const JOB_TITLE: &str = "Job Title";
    pub const START_DATE: &str = "Start Date";
    pub const BASIC_SALARY: &str = "Basic Salary";
    pub const PENSION_CONTRIBUTION: &str = "Pension Contribution";
    pub const MARITAL_STATUS: &str = "Marital Status";
    pub const NATIONALITY: &str = "Nationality";
    pub const COUNTRY_OF_RESIDENCE: &str = "Country of Residence";
    pub const EMERGENCY_CONTACT_NAME: &str = "Emergency Contact Name";
    pub const EMERGENCY_CONTACT_NUMBER: &str = "Emergency Contact Number";
    pub const EMERGENCY_CONTACT_ADDRESS: &str = "Emergency Contact Address";
    pub const EMERGENCY_CONTACT_EMAIL: &str = "Emergency Contact Email";
    pub const EMERGENCY_CONTACT_RELATIONSHIP: &str = "Emergency Contact Relationship";
    pub const EMPLOYMENT_LOCATION_POSTCODE: &str = "Employment Location Postcode";
    pub const NOTES: &str = "Notes";
}

/// Built-in `(label, canonical field)` table, tried in this order.
///
/// A label that starts with another label must come first, otherwise the
/// shorter one captures the line.
const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("Title", field::TITLE),
    ("Full Name", field::FULL_NAME),
    ("Home Address", field::HOME_ADDRESS),
    ("Home Telephone Number", field::HOME_TELEPHONE),
    ("Mobile Telephone Number", field::MOBILE_TELEPHONE),
    ("Telephone Number of Emergency Contact", field::EMERGENCY_CONTACT_NUMBER),
    ("Telephone Number", field::TELEPHONE),
    ("Personal Email Address", field::PERSONAL_EMAIL),
    ("Date of Birth", field::DATE_OF_BIRTH),
    ("Pronouns", field::PRONOUNS),
    ("National Insurance Number", field::NI_NUMBER),
    ("National Insurance No.", field::NI_NUMBER),
    ("Job Title", field::JOB_TITLE),
    ("Start Date", field::START_DATE),
    ("Date Employment Commenced", field::START_DATE),
    ("Basic Salary", field::BASIC_SALARY),
    ("Pension Contribution", field::PENSION_CONTRIBUTION),
    ("Marital Status", field::MARITAL_STATUS),
    ("Nationality", field::NATIONALITY),
    ("Country of Residence", field::COUNTRY_OF_RESIDENCE),
    ("Name of an Emergency Contact", field::EMERGENCY_CONTACT_NAME),
    ("Emergency Contact Name", field::EMERGENCY_CONTACT_NAME),
    ("Emergency Contact Number", field::EMERGENCY_CONTACT_NUMBER),
    ("Emergency Contact Address", field::EMERGENCY_CONTACT_ADDRESS),
    ("Emergency Contact Email", field::EMERGENCY_CONTACT_EMAIL),
    ("Relationship to Emergency Contact", field::EMERGENCY_CONTACT_RELATIONSHIP),
    ("Employment Location Postcode", field::EMPLOYMENT_LOCATION_POSTCODE),
    ("Notes", field::NOTES),
];

/// One dictionary entry, also the shape used in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Label text as printed on the form.
    pub label: String,
    /// Canonical field the label maps to.
    pub field: String,
}

/// Ordered, many-to-one label table. First matching entry wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDictionary {
    entries: Vec<LabelEntry>,
}

impl LabelDictionary {
    /// Dictionary with the built-in form labels.
    pub fn new() -> Self {
        Self {
            entries: BUILTIN_LABELS
                .iter()
                .map(|(label, field)| LabelEntry {
                    label: (*label).to_string(),
                    field: (*field).to_string(),
                })
                .collect(),
        }
    }

    /// Dictionary with no entries.
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append an alias. Entries added later are tried after existing ones.
    pub fn with_label(mut self, label: impl Into<String>, field: impl Into<String>) -> Self {
        self.push(LabelEntry {
            label: label.into(),
            field: field.into(),
        });
        self
    }

    /// Append entries, e.g. from configuration.
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = LabelEntry>) -> Self {
        for entry in entries {
            self.push(entry);
        }
        self
    }

    fn push(&mut self, entry: LabelEntry) {
        let label = entry.label.trim();
        if label.is_empty() {
            return;
        }
        self.entries.push(LabelEntry {
            label: label.to_string(),
            field: entry.field.trim().to_string(),
        });
    }

    /// Canonical field for an exact (case-insensitive) label.
    pub fn canonicalize(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.entries
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(label))
            .map(|e| e.field.as_str())
    }

    /// Entries in match order.
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelDictionary {
    fn default() -> Self {
        Self::new()
    }
}
