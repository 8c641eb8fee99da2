use tracing::debug;

use super::ValidationPolicy;
use super::field::{validate_format, validate_required};
use crate::models::{FieldName, FormData, FormErrors, Step};

/// Fields that must be non-blank before leaving `step`.
pub fn required_fields(step: Step) -> &'static [FieldName] {
    match step {
        Step::StudentDetails => &[
            FieldName::FullName,
            FieldName::BloodGroup,
            FieldName::Interests,
        ],
        // The previous-school section is always optional.
        Step::PreviousSchooling => &[],
        Step::ParentDetails => &[
            FieldName::FatherName,
            FieldName::FatherAge,
            FieldName::MotherName,
            FieldName::MotherAge,
            FieldName::RelationshipStatus,
        ],
        Step::AddressAndPreferences => &[
            FieldName::PresentAddress,
            FieldName::PermanentAddress,
            FieldName::LanguageSpoken,
            FieldName::SchoolBudget,
        ],
    }
}

/// Required-field check for one step. Fields on other steps are not looked at.
pub fn validate_step(
    step: Step,
    data: &FormData,
) -> FormErrors {
    required_fields(step)
        .iter()
        .filter_map(|field| validate_required(*field, data.get(*field)).map(|msg| (*field, msg)))
        .collect()
}

/// Step validator with a configurable [`ValidationPolicy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    policy: ValidationPolicy,
}

impl Validator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn validate_step(
        &self,
        step: Step,
        data: &FormData,
    ) -> FormErrors {
        let mut errors = validate_step(step, data);

        if self.policy == ValidationPolicy::Strict {
            for field in step.fields() {
                if errors.contains(field) {
                    continue;
                }
                if let Some(msg) = validate_format(field, data.get(field)) {
                    errors.insert(field, msg);
                }
            }
        }

        debug!(step = step.number(), errors = errors.len(), "validated step");
        errors
    }

    /// Every step's checks combined into one map.
    pub fn validate_all(
        &self,
        data: &FormData,
    ) -> FormErrors {
        Step::ALL
            .iter()
            .fold(FormErrors::new(), |mut acc, step| {
                acc.extend(self.validate_step(*step, data));
                acc
            })
    }
}
