//! The application form's field table.
//!
//! Every field of the intake form is declared exactly once in the
//! `form_fields!` invocation below. The macro expands into the [`FieldName`]
//! enum (the closed set of keys used by validators, the backend schema and
//! CSV headers) and the storage struct [`FormData`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Step;

/// Error returned when a string does not name a form field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field '{0}'")]
pub struct ParseFieldNameError(pub String);

macro_rules! form_fields {
    ($( $variant:ident => $field:ident, $camel:literal, $label:literal, $step:ident; )*) => {
        /// Names every field of the application form.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum FieldName {
            $( $variant, )*
        }

        impl FieldName {
            /// Every field, in declaration (screen) order.
            pub const ALL: &'static [FieldName] = &[ $( FieldName::$variant, )* ];

            /// snake_case key used for backend columns and CSV headers.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => stringify!($field), )*
                }
            }

            /// camelCase key used in serialized payloads.
            pub fn camel_case(&self) -> &'static str {
                match self {
                    $( Self::$variant => $camel, )*
                }
            }

            /// Human-readable label shown next to the input.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )*
                }
            }

            /// The step whose screen renders this field.
            pub fn step(&self) -> Step {
                match self {
                    $( Self::$variant => Step::$step, )*
                }
            }

            /// Accepts either the snake_case or the camelCase key.
            pub fn parse(s: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|field| field.as_str() == s || field.camel_case() == s)
            }
        }

        /// The full set of values entered on the application form.
        ///
        /// All values are strings and default to empty. The record is a value
        /// type: edits go through [`FormData::with_field`], which returns a new
        /// record and leaves the original untouched.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        pub struct FormData {
            $( $field: String, )*
        }

        impl FormData {
            /// Current value of `field`.
            pub fn get(&self, field: FieldName) -> &str {
                match field {
                    $( FieldName::$variant => &self.$field, )*
                }
            }

            pub(super) fn slot_mut(&mut self, field: FieldName) -> &mut String {
                match field {
                    $( FieldName::$variant => &mut self.$field, )*
                }
            }
        }
    };
}

form_fields! {
    // Student identity
    FullName => full_name, "fullName", "Full Name", StudentDetails;
    DateOfBirth => date_of_birth, "dateOfBirth", "Date of Birth", StudentDetails;
    Gender => gender, "gender", "Gender", StudentDetails;
    Nationality => nationality, "nationality", "Nationality", StudentDetails;
    PlaceOfBirth => place_of_birth, "placeOfBirth", "Place of Birth", StudentDetails;
    Religion => religion, "religion", "Religion", StudentDetails;
    Caste => caste, "caste", "Caste", StudentDetails;
    BloodGroup => blood_group, "bloodGroup", "Blood Group", StudentDetails;
    Allergies => allergies, "allergies", "Allergies", StudentDetails;
    Interests => interests, "interests", "Interests", StudentDetails;

    // Prior schooling
    LastSchool => last_school, "lastSchool", "Last School Attended", PreviousSchooling;
    ClassCompleted => class_completed, "classCompleted", "Class Completed", PreviousSchooling;
    LastAcademicYear => last_academic_year, "lastAcademicYear", "Last Academic Year", PreviousSchooling;
    ReasonForLeaving => reason_for_leaving, "reasonForLeaving", "Reason for Leaving", PreviousSchooling;
    Board => board, "board", "Board", PreviousSchooling;

    // Father's details
    FatherName => father_name, "fatherName", "Father's Name", ParentDetails;
    FatherAge => father_age, "fatherAge", "Father's Age", ParentDetails;
    FatherQualification => father_qualification, "fatherQualification", "Father's Qualification", ParentDetails;
    FatherProfession => father_profession, "fatherProfession", "Father's Profession", ParentDetails;
    FatherIncome => father_income, "fatherIncome", "Father's Annual Income", ParentDetails;
    FatherPhone => father_phone, "fatherPhone", "Father's Phone", ParentDetails;
    FatherIdNumber => father_id_number, "fatherIdNumber", "Father's ID Number", ParentDetails;
    FatherEmail => father_email, "fatherEmail", "Father's Email", ParentDetails;

    // Mother's details
    MotherName => mother_name, "motherName", "Mother's Name", ParentDetails;
    MotherAge => mother_age, "motherAge", "Mother's Age", ParentDetails;
    MotherQualification => mother_qualification, "motherQualification", "Mother's Qualification", ParentDetails;
    MotherProfession => mother_profession, "motherProfession", "Mother's Profession", ParentDetails;
    MotherIncome => mother_income, "motherIncome", "Mother's Annual Income", ParentDetails;
    MotherPhone => mother_phone, "motherPhone", "Mother's Phone", ParentDetails;
    MotherIdNumber => mother_id_number, "motherIdNumber", "Mother's ID Number", ParentDetails;
    MotherEmail => mother_email, "motherEmail", "Mother's Email", ParentDetails;

    RelationshipStatus => relationship_status, "relationshipStatus", "Parents' Relationship Status", ParentDetails;

    // Address and logistics
    PresentAddress => present_address, "presentAddress", "Present Address", AddressAndPreferences;
    PermanentAddress => permanent_address, "permanentAddress", "Permanent Address", AddressAndPreferences;
    LanguageSpoken => language_spoken, "languageSpoken", "Language Spoken at Home", AddressAndPreferences;
    SchoolBudget => school_budget, "schoolBudget", "School Budget", AddressAndPreferences;
}

impl fmt::Display for FieldName {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = ParseFieldNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim()).ok_or_else(|| ParseFieldNameError(s.to_string()))
    }
}
