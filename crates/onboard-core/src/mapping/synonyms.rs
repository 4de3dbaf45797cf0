//! Ordered synonym tables: which source keys feed which output field.
//!
//! Each field lists accepted keys in precedence order. Resolution takes the
//! first key that is present with a non-blank value.

use super::fields::OutputField;
use crate::extract::labels::field;
use crate::models::record::RawFieldMap;
use crate::models::value::Value;

/// Source keys for one extraction path.
#[derive(Debug, Clone, Copy)]
pub struct SynonymTable {
    /// Scalar fields copied as-is (dates are normalized afterwards).
    pub direct: &'static [(OutputField, &'static [&'static str])],
    /// Whole-name keys, split into first name and surname when no direct
    /// name keys resolve.
    pub full_name: &'static [&'static str],
    /// Whole-address keys, segmented into lines and postcode when no direct
    /// address-line keys resolve.
    pub address: &'static [&'static str],
}

impl SynonymTable {
    /// Keys accepted for a direct field; empty when the field has none.
    pub fn keys(&self, target: OutputField) -> &'static [&'static str] {
        self.direct
            .iter()
            .find(|(f, _)| *f == target)
            .map(|(_, keys)| *keys)
            .unwrap_or(&[])
    }
}

/// Keys from the line extractor, i.e. label dictionary canonical names.
pub const FREE_TEXT: SynonymTable = SynonymTable {
    direct: &[
        (OutputField::Title, &[field::TITLE]),
        (OutputField::MaritalStatus, &[field::MARITAL_STATUS]),
        (OutputField::DateOfBirth, &[field::DATE_OF_BIRTH]),
        (OutputField::NiNumber, &[field::NI_NUMBER]),
        (OutputField::StartDate, &[field::START_DATE]),
        (OutputField::JobTitle, &[field::JOB_TITLE]),
        (OutputField::Salary, &[field::BASIC_SALARY]),
        (OutputField::Nationality, &[field::NATIONALITY]),
        (OutputField::Email, &[field::PERSONAL_EMAIL]),
        (
            OutputField::MobilePhone,
            &[field::MOBILE_TELEPHONE, field::TELEPHONE, field::HOME_TELEPHONE],
        ),
        (OutputField::PensionContribution, &[field::PENSION_CONTRIBUTION]),
        (
            OutputField::EmploymentLocationPostcode,
            &[field::EMPLOYMENT_LOCATION_POSTCODE],
        ),
        (OutputField::Notes, &[field::NOTES]),
    ],
    full_name: &[field::FULL_NAME],
    address: &[field::HOME_ADDRESS],
};

/// Column headers seen in spreadsheets and CSV exports. More specific
/// spellings come before generic ones.
pub const TABULAR: SynonymTable = SynonymTable {
    direct: &[
        (OutputField::Title, &["Title", "Salutation"]),
        (OutputField::FirstName, &["First Name", "Forename", "Forenames", "Given Name"]),
        (OutputField::Surname, &["Surname", "Last Name", "Family Name"]),
        (OutputField::LegalGender, &["Legal Gender", "Gender", "Sex"]),
        (OutputField::MaritalStatus, &["Marital Status"]),
        (OutputField::Address1, &["Address 1", "Address Line 1", "Address1"]),
        (OutputField::Address2, &["Address 2", "Address Line 2", "Address2"]),
        (OutputField::Address3, &["Address 3", "Address Line 3", "Address3"]),
        (OutputField::Address4, &["Address 4", "Address Line 4", "Address4"]),
        (OutputField::Postcode, &["Post Code", "Postcode", "Postal Code"]),
        (OutputField::DateOfBirth, &["Date of Birth", "DOB", "Birth Date"]),
        (
            OutputField::NiNumber,
            &["NI Number", "National Insurance Number", "National Insurance No.", "NINO"],
        ),
        (
            OutputField::StartDate,
            &["Start Date", "Employment Start Date", "Date Employment Commenced"],
        ),
        (OutputField::JobTitle, &["Job Title", "Position", "Role"]),
        (OutputField::Salary, &["Basic Annual Salary", "Basic Salary", "Salary"]),
        (OutputField::Nationality, &["Nationality"]),
        (OutputField::Email, &["Email Address", "Personal Email Address", "Email"]),
        (
            OutputField::MobilePhone,
            &["Mobile Number", "Mobile Telephone Number", "Telephone Number", "Phone"],
        ),
        (OutputField::PensionContribution, &["Pension Contribution", "Employee Contribution"]),
        (OutputField::EmploymentLocationPostcode, &["Employment Location Postcode"]),
        (OutputField::Notes, &["Any Other Information", "Notes", "Comments"]),
    ],
    full_name: &["Full Name", "Employee Name", "Name"],
    address: &["Home Address", "Address"],
};

/// First present, non-blank value among `keys`, in order.
pub fn first_present<'a>(raw: &'a RawFieldMap, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| raw.get_ignore_case(key))
        .find(|value| !value.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_precedence() {
        let raw: RawFieldMap = [("Salary", "20000"), ("Basic Salary", "30000")]
            .into_iter()
            .collect();
        let keys = TABULAR.keys(OutputField::Salary);
        assert_eq!(first_present(&raw, keys), Some(&Value::from("30000")));
    }

    #[test]
    fn test_first_present_skips_blank() {
        let raw: RawFieldMap = [("Basic Annual Salary", " "), ("Salary", "20000")]
            .into_iter()
            .collect();
        let keys = TABULAR.keys(OutputField::Salary);
        assert_eq!(first_present(&raw, keys), Some(&Value::from("20000")));
    }

    #[test]
    fn test_first_present_none() {
        let raw = RawFieldMap::new();
        assert_eq!(first_present(&raw, TABULAR.keys(OutputField::Salary)), None);
        assert!(FREE_TEXT.keys(OutputField::LegalGender).is_empty());
    }

    #[test]
    fn test_header_case_ignored() {
        let raw: RawFieldMap = [("date of birth", "01/03/1987")].into_iter().collect();
        assert!(first_present(&raw, TABULAR.keys(OutputField::DateOfBirth)).is_some());
    }
}
