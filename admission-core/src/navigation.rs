//! Which navigation controls a step shows, and the actions they raise.

use std::str::FromStr;

use thiserror::Error;

use crate::models::Step;
use crate::submission::UiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Next,
    Previous,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown navigation action '{0}'")]
pub struct ParseNavActionError(pub String);

impl FromStr for NavAction {
    type Err = ParseNavActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next" | "n" => Ok(Self::Next),
            "previous" | "prev" | "back" | "p" => Ok(Self::Previous),
            "submit" => Ok(Self::Submit),
            _ => Err(ParseNavActionError(s.to_string())),
        }
    }
}

/// Controls rendered under the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub previous: bool,
    pub next: bool,
    pub submit: bool,
    /// `false` while a submission is in flight or after success.
    pub enabled: bool,
}

impl Controls {
    pub fn for_state(
        step: Step,
        state: &UiState,
    ) -> Self {
        Self {
            previous: step.previous().is_some(),
            next: !step.is_last(),
            submit: step.is_last(),
            enabled: state.accepts_input(),
        }
    }

    /// Whether `action` corresponds to a rendered, enabled control.
    pub fn allows(
        &self,
        action: NavAction,
    ) -> bool {
        self.enabled
            && match action {
                NavAction::Next => self.next,
                NavAction::Previous => self.previous,
                NavAction::Submit => self.submit,
            }
    }
}
