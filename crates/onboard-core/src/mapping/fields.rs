//! Semantic output fields and the output profiles that name them.

use serde::{Deserialize, Serialize};

/// A semantic field of an employee record, independent of column naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputField {
    Title,
    FirstName,
    Surname,
    LegalGender,
    MaritalStatus,
    Address1,
    Address2,
    Address3,
    Address4,
    Postcode,
    DateOfBirth,
    NiNumber,
    StartDate,
    JobTitle,
    Salary,
    Nationality,
    Email,
    MobilePhone,
    PensionContribution,
    EmploymentLocationPostcode,
    Notes,
}

impl OutputField {
    /// Fields that go through the date normalizer.
    pub fn is_date(self) -> bool {
        matches!(self, Self::DateOfBirth | Self::StartDate)
    }

    /// The four positional address lines, in order.
    pub const ADDRESS_LINES: [OutputField; 4] =
        [Self::Address1, Self::Address2, Self::Address3, Self::Address4];
}

/// How a full name is split into first name and surname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurnameRule {
    /// Surname is every token after the first, joined by single spaces.
    RemainingTokens,
    /// Surname is the last token only.
    LastToken,
}

/// Named column layout a record is rendered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputProfile {
    /// General HR master record.
    #[default]
    Hr,
    /// Pension-scheme enrolment record.
    Pension,
}

const HR_COLUMNS: &[(OutputField, &str)] = &[
    (OutputField::Title, "Title"),
    (OutputField::FirstName, "First Name"),
    (OutputField::Surname, "Surname"),
    (OutputField::LegalGender, "Legal Gender"),
    (OutputField::MaritalStatus, "Marital Status"),
    (OutputField::Address1, "Address 1"),
    (OutputField::Address2, "Address 2"),
    (OutputField::Address3, "Address 3"),
    (OutputField::Address4, "Address 4"),
    (OutputField::Postcode, "Post Code"),
    (OutputField::DateOfBirth, "Date of Birth"),
    (OutputField::NiNumber, "NI Number"),
    (OutputField::StartDate, "Start Date"),
    (OutputField::JobTitle, "Job Title"),
    (OutputField::Salary, "Basic Annual Salary"),
    (OutputField::Nationality, "Nationality"),
    (OutputField::Email, "Email Address"),
    (OutputField::Notes, "Any Other Information"),
];

const PENSION_COLUMNS: &[(OutputField, &str)] = &[
    (OutputField::Title, "Title"),
    (OutputField::FirstName, "Forename"),
    (OutputField::Surname, "Surname"),
    (OutputField::LegalGender, "Gender"),
    (OutputField::DateOfBirth, "Date of Birth"),
    (OutputField::NiNumber, "National Insurance Number"),
    (OutputField::Address1, "Address Line 1"),
    (OutputField::Address2, "Address Line 2"),
    (OutputField::Address3, "Address Line 3"),
    (OutputField::Address4, "Address Line 4"),
    (OutputField::Postcode, "Postcode"),
    (OutputField::Email, "Email Address"),
    (OutputField::MobilePhone, "Mobile Number"),
    (OutputField::StartDate, "Employment Start Date"),
    (OutputField::Salary, "Pensionable Salary"),
    (OutputField::PensionContribution, "Pension Contribution"),
    (OutputField::EmploymentLocationPostcode, "Employment Location Postcode"),
];

impl OutputProfile {
    /// Ordered `(field, column name)` pairs of this profile.
    pub fn columns(self) -> &'static [(OutputField, &'static str)] {
        match self {
            Self::Hr => HR_COLUMNS,
            Self::Pension => PENSION_COLUMNS,
        }
    }

    /// Column name of a field, `None` if the profile does not carry it.
    pub fn column_for(self, field: OutputField) -> Option<&'static str> {
        self.columns()
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, name)| *name)
    }

    /// Columns holding calendar dates.
    pub fn date_columns(self) -> impl Iterator<Item = &'static str> {
        self.columns()
            .iter()
            .filter(|(field, _)| field.is_date())
            .map(|(_, name)| *name)
    }

    /// The name-splitting convention this profile was designed around.
    pub fn default_surname_rule(self) -> SurnameRule {
        match self {
            Self::Hr => SurnameRule::RemainingTokens,
            Self::Pension => SurnameRule::LastToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_columns_unique() {
        for profile in [OutputProfile::Hr, OutputProfile::Pension] {
            let mut names: Vec<_> = profile.columns().iter().map(|(_, n)| *n).collect();
            let total = names.len();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), total, "{profile:?} has duplicate columns");
        }
    }

    #[test]
    fn test_date_columns() {
        let hr: Vec<_> = OutputProfile::Hr.date_columns().collect();
        assert_eq!(hr, vec!["Date of Birth", "Start Date"]);

        let pension: Vec<_> = OutputProfile::Pension.date_columns().collect();
        assert_eq!(pension, vec!["Date of Birth", "Employment Start Date"]);
    }

    #[test]
    fn test_column_for() {
        assert_eq!(OutputProfile::Hr.column_for(OutputField::FirstName), Some("First Name"));
        assert_eq!(OutputProfile::Pension.column_for(OutputField::FirstName), Some("Forename"));
        assert_eq!(OutputProfile::Hr.column_for(OutputField::MobilePhone), None);
    }
}
