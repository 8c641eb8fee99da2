use std::fmt;

use serde::{Deserialize, Serialize};

use super::FieldName;

/// One screen of the four-step application form.
///
/// Steps are strictly ordered; navigation moves one step at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    #[default]
    StudentDetails,
    PreviousSchooling,
    ParentDetails,
    AddressAndPreferences,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::StudentDetails,
        Step::PreviousSchooling,
        Step::ParentDetails,
        Step::AddressAndPreferences,
    ];

    pub const FIRST: Step = Step::StudentDetails;
    pub const LAST: Step = Step::AddressAndPreferences;

    /// 1-based position, in `1..=4`.
    pub fn number(&self) -> u8 {
        match self {
            Self::StudentDetails => 1,
            Self::PreviousSchooling => 2,
            Self::ParentDetails => 3,
            Self::AddressAndPreferences => 4,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::StudentDetails),
            2 => Some(Self::PreviousSchooling),
            3 => Some(Self::ParentDetails),
            4 => Some(Self::AddressAndPreferences),
            _ => None,
        }
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn is_last(&self) -> bool {
        *self == Self::LAST
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::StudentDetails => "Student Details",
            Self::PreviousSchooling => "Previous School",
            Self::ParentDetails => "Parent Details",
            Self::AddressAndPreferences => "Address & Preferences",
        }
    }

    /// Fields rendered on this step, in screen order.
    pub fn fields(self) -> impl Iterator<Item = FieldName> {
        FieldName::ALL
            .iter()
            .copied()
            .filter(move |field| field.step() == self)
    }
}

impl fmt::Display for Step {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Step {} of 4: {}", self.number(), self.title())
    }
}
