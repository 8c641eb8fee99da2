//! The multi-step application form's state holder.
//!
//! [`ApplicationForm`] owns the current [`FormData`], [`Step`], the last
//! validation pass's [`FormErrors`] and the [`UiState`]. All mutation goes
//! through its methods, which are called from a single UI task. The only
//! asynchronous boundary is the backend write. [`ApplicationForm::submit`]
//! validates, enters `Submitting` and spawns the write as a tokio task that
//! the form keeps hold of; [`ApplicationForm::wait_for_submission`] applies
//! its result and [`ApplicationForm::cancel_submission`] aborts it. At most
//! one write task exists per form.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::FormConfig;
use crate::db::{ApplicationRepository, SessionProvider};
use crate::models::{ApplicationRecord, FieldName, FormData, FormErrors, Step};
use crate::navigation::{Controls, NavAction};
use crate::submission::{SubmissionError, SubmissionTicket, SubmissionTrigger, UiState};
use crate::validation::Validator;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("the form is not accepting input while {0}")]
    InputLocked(&'static str),

    #[error("{} field(s) need attention on {step}", .errors.len())]
    Invalid { step: Step, errors: FormErrors },

    #[error("applications can only be submitted from the last step (currently on {0})")]
    NotFinalStep(Step),

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("this application has already been submitted")]
    AlreadySubmitted,

    #[error("nothing to start over from; the form has not been submitted")]
    NothingToReset,

    #[error("sign in before submitting an application")]
    NotSignedIn,

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Result of a navigation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    /// Now showing this step.
    Moved(Step),
    /// Final validation passed and the write is running.
    Submitting(SubmissionTicket),
}

pub struct ApplicationForm {
    data: FormData,
    step: Step,
    errors: FormErrors,
    state: UiState,
    config: FormConfig,
    validator: Validator,
    session: Arc<dyn SessionProvider>,
    trigger: SubmissionTrigger,
    last_ticket: u64,
    in_flight: Option<InFlight>,
}

/// The running write for the current submission.
struct InFlight {
    id: u64,
    task: JoinHandle<Result<(), SubmissionError>>,
}

impl ApplicationForm {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        session: Arc<dyn SessionProvider>,
        config: FormConfig,
    ) -> Self {
        let trigger = SubmissionTrigger::new(repository, config.submission_timeout());
        Self {
            data: FormData::default(),
            step: Step::FIRST,
            errors: FormErrors::new(),
            state: UiState::Idle,
            validator: Validator::new(config.validation),
            config,
            session,
            trigger,
            last_ticket: 0,
            in_flight: None,
        }
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn field(
        &self,
        name: FieldName,
    ) -> &str {
        self.data.get(name)
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Errors from the most recent validation pass.
    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    pub fn controls(&self) -> Controls {
        Controls::for_state(self.step, &self.state)
    }

    /// `true` once the running write has finished and its result can be
    /// applied without waiting.
    pub fn submission_finished(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.task.is_finished())
    }

    fn ensure_accepts_input(&self) -> Result<(), FormError> {
        if self.state.accepts_input() {
            Ok(())
        } else {
            Err(FormError::InputLocked(self.state.name()))
        }
    }

    /// Replaces one field. No validation runs.
    pub fn update_field(
        &mut self,
        name: FieldName,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.ensure_accepts_input()?;
        self.data = self.data.with_field(name, value);
        debug!(field = %name, "field updated");
        Ok(())
    }

    /// Validates the current step and moves forward if it is clean.
    ///
    /// On the last step a clean pass leaves the step unchanged; submission
    /// is a separate action.
    pub fn advance(&mut self) -> Result<Step, FormError> {
        self.ensure_accepts_input()?;

        let errors = self.validator.validate_step(self.step, &self.data);
        if !errors.is_empty() {
            debug!(step = self.step.number(), errors = errors.len(), "advance blocked");
            self.errors = errors.clone();
            return Err(FormError::Invalid {
                step: self.step,
                errors,
            });
        }

        self.errors = FormErrors::new();
        if let Some(next) = self.step.next() {
            debug!(from = self.step.number(), to = next.number(), "advancing");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Moves back one step. Entered values and errors are kept.
    pub fn retreat(&mut self) -> Result<Step, FormError> {
        self.ensure_accepts_input()?;
        if let Some(previous) = self.step.previous() {
            debug!(from = self.step.number(), to = previous.number(), "retreating");
            self.step = previous;
        }
        Ok(self.step)
    }

    /// Final-step validation; on success enters `Submitting`, starts the
    /// backend write and returns its ticket.
    ///
    /// Only the last step's validator runs unless
    /// [`FormConfig::revalidate_all_on_submit`] is set, in which case every
    /// step is checked and the form moves back to the earliest step with an
    /// error.
    ///
    /// Must be called from within a tokio runtime once validation passes.
    pub fn submit(&mut self) -> Result<SubmissionTicket, FormError> {
        if self.in_flight.is_some() {
            return Err(FormError::SubmissionInFlight);
        }
        match self.state {
            UiState::Submitting => return Err(FormError::SubmissionInFlight),
            UiState::Success => return Err(FormError::AlreadySubmitted),
            UiState::Idle | UiState::Failed { .. } => {}
        }
        if !self.step.is_last() {
            return Err(FormError::NotFinalStep(self.step));
        }

        let errors = if self.config.revalidate_all_on_submit {
            self.validator.validate_all(&self.data)
        } else {
            self.validator.validate_step(self.step, &self.data)
        };
        if !errors.is_empty() {
            if let Some(first) = errors.fields().first() {
                self.step = self.step.min(first.step());
            }
            debug!(errors = errors.len(), "submission blocked by validation");
            self.errors = errors.clone();
            return Err(FormError::Invalid {
                step: self.step,
                errors,
            });
        }
        self.errors = FormErrors::new();

        let user_id = self
            .session
            .current_user_id()
            .ok_or(FormError::NotSignedIn)?;
        let submitted_by = self
            .session
            .submitted_by()
            .unwrap_or_else(|| user_id.clone());

        self.last_ticket += 1;
        let ticket = SubmissionTicket::new(
            self.last_ticket,
            ApplicationRecord::new(user_id, submitted_by, self.data.clone()),
        );

        let trigger = self.trigger.clone();
        let job = ticket.clone();
        let task = tokio::spawn(async move { trigger.dispatch(&job).await });

        self.in_flight = Some(InFlight {
            id: ticket.id(),
            task,
        });
        self.state = UiState::Submitting;
        info!(ticket = ticket.id(), "application entering submission");
        Ok(ticket)
    }

    fn apply_result(
        &mut self,
        ticket_id: u64,
        result: Result<(), SubmissionError>,
    ) {
        self.state = match result {
            Ok(()) => UiState::Success,
            Err(error) => {
                warn!(ticket = ticket_id, %error, "submission failed; form unlocked");
                UiState::Failed {
                    message: error.to_string(),
                }
            }
        };
    }

    /// Waits for the running write and applies its result: `Success` on
    /// acknowledgement, `Failed` otherwise.
    ///
    /// Returns `None` when no write is running. Dropping the returned future
    /// early leaves the write running and the form in `Submitting`.
    pub async fn wait_for_submission(&mut self) -> Option<Result<(), SubmissionError>> {
        let in_flight = self.in_flight.as_mut()?;
        let joined = (&mut in_flight.task).await;
        let id = in_flight.id;
        self.in_flight = None;

        let result = joined.unwrap_or_else(|e| Err(SubmissionError::Interrupted(e.to_string())));
        self.apply_result(id, result.clone());
        Some(result)
    }

    /// Aborts the running write and unlocks the form.
    ///
    /// Resolves only once the write task has stopped, so a new submission can
    /// never overlap the cancelled one. Returns `true` when the write was
    /// stopped before it completed. If the write had already finished its
    /// result is applied as usual and `false` is returned.
    pub async fn cancel_submission(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return false;
        };
        in_flight.task.abort();
        let joined = (&mut in_flight.task).await;
        let id = in_flight.id;
        self.in_flight = None;

        match joined {
            Err(e) if e.is_cancelled() => {
                info!(ticket = id, "submission cancelled");
                self.state = UiState::Idle;
                true
            }
            Err(e) => {
                self.apply_result(id, Err(SubmissionError::Interrupted(e.to_string())));
                false
            }
            Ok(result) => {
                debug!(ticket = id, "write finished before cancellation");
                self.apply_result(id, result);
                false
            }
        }
    }

    /// Submits, waits for the backend and applies the result.
    pub async fn submit_and_wait(&mut self) -> Result<(), FormError> {
        self.submit()?;
        match self.wait_for_submission().await {
            Some(result) => result.map_err(FormError::from),
            None => Ok(()),
        }
    }

    /// Dispatches a navigation control.
    pub fn handle(
        &mut self,
        action: NavAction,
    ) -> Result<NavOutcome, FormError> {
        match action {
            NavAction::Next => self.advance().map(NavOutcome::Moved),
            NavAction::Previous => self.retreat().map(NavOutcome::Moved),
            NavAction::Submit => self.submit().map(NavOutcome::Submitting),
        }
    }

    /// "Submit another": back to an empty form on step 1.
    ///
    /// Only available after a submission attempt has finished, so a form in
    /// progress is never wiped by accident.
    pub fn reset(&mut self) -> Result<(), FormError> {
        match self.state {
            UiState::Submitting => return Err(FormError::SubmissionInFlight),
            UiState::Idle => return Err(FormError::NothingToReset),
            UiState::Success | UiState::Failed { .. } => {}
        }
        self.data = FormData::default();
        self.step = Step::FIRST;
        self.errors = FormErrors::new();
        self.state = UiState::Idle;
        debug!("form reset");
        Ok(())
    }
}

impl Drop for ApplicationForm {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(ticket = in_flight.id, "form dropped; aborting write");
            in_flight.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::{InMemoryApplicationRepository, StaticSession};

    fn form() -> ApplicationForm {
        ApplicationForm::new(
            Arc::new(InMemoryApplicationRepository::new()),
            Arc::new(StaticSession::signed_in("parent-1")),
            FormConfig::default(),
        )
    }

    #[test]
    fn starts_idle_on_step_one_with_blank_data() {
        let form = form();
        assert_eq!(form.step(), Step::StudentDetails);
        assert_eq!(form.state(), &UiState::Idle);
        assert!(form.data().is_blank());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn update_field_does_not_validate() {
        let mut form = form();
        form.update_field(FieldName::FullName, "").unwrap();
        assert!(form.errors().is_empty());
    }

    #[test]
    fn retreat_is_floored_at_step_one() {
        let mut form = form();
        assert_eq!(form.retreat(), Ok(Step::StudentDetails));
        assert_eq!(form.retreat(), Ok(Step::StudentDetails));
    }

    #[test]
    fn submit_outside_last_step_is_rejected_without_side_effects() {
        let mut form = form();
        assert_eq!(
            form.submit(),
            Err(FormError::NotFinalStep(Step::StudentDetails))
        );
        assert_eq!(form.state(), &UiState::Idle);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn handle_routes_actions() {
        let mut form = form();
        assert!(matches!(
            form.handle(NavAction::Next),
            Err(FormError::Invalid { .. })
        ));
        form.update_field(FieldName::FullName, "Aarav").unwrap();
        form.update_field(FieldName::BloodGroup, "O+").unwrap();
        form.update_field(FieldName::Interests, "Chess").unwrap();
        assert_eq!(
            form.handle(NavAction::Next),
            Ok(NavOutcome::Moved(Step::PreviousSchooling))
        );
        assert_eq!(
            form.handle(NavAction::Previous),
            Ok(NavOutcome::Moved(Step::StudentDetails))
        );
    }

    #[tokio::test]
    async fn waiting_without_a_submission_is_a_no_op() {
        let mut form = form();
        assert_eq!(form.wait_for_submission().await, None);
        assert!(!form.cancel_submission().await);
        assert!(!form.submission_finished());
        assert_eq!(form.state(), &UiState::Idle);
    }

    #[test]
    fn reset_refuses_to_wipe_a_form_in_progress() {
        let mut form = form();
        form.update_field(FieldName::FullName, "Aarav").unwrap();
        assert_eq!(form.reset(), Err(FormError::NothingToReset));
        assert_eq!(form.field(FieldName::FullName), "Aarav");
    }
}
