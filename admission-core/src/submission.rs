//! Submission state and the single backend write performed on final submit.

use std::{fmt, sync::Arc, time::Duration};

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{ApplicationRepository, RepositoryError};
use crate::models::ApplicationRecord;

/// What the form screen is doing.
///
/// ```text
/// Idle --submit(valid)--> Submitting --ack--> Success --reset--> Idle
///                              |
///                              +--error--> Failed --submit(valid)--> Submitting
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiState {
    #[default]
    Idle,
    Submitting,
    Success,
    /// The last write failed; the form is editable again and may be resubmitted.
    Failed { message: String },
}

impl UiState {
    /// Field edits and navigation are only possible in these states.
    pub fn accepts_input(&self) -> bool {
        matches!(self, Self::Idle | Self::Failed { .. })
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Success => "success",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for UiState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Failed { message } => write!(f, "failed: {message}"),
            other => f.write_str(other.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("could not save application: {0}")]
    Repository(#[from] RepositoryError),

    #[error("no response from the server after {0:?}")]
    TimedOut(Duration),

    #[error("submission task stopped unexpectedly: {0}")]
    Interrupted(String),
}

/// A submission that has passed validation and is waiting to be written.
///
/// The id identifies the write in logs; the form that issued it owns the
/// task performing the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    id: u64,
    record: ApplicationRecord,
}

impl SubmissionTicket {
    pub(crate) fn new(
        id: u64,
        record: ApplicationRecord,
    ) -> Self {
        Self { id, record }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn record(&self) -> &ApplicationRecord {
        &self.record
    }
}

/// Performs the one write a submission makes. No retries.
#[derive(Clone)]
pub struct SubmissionTrigger {
    repository: Arc<dyn ApplicationRepository>,
    timeout: Duration,
}

impl SubmissionTrigger {
    pub fn new(
        repository: Arc<dyn ApplicationRepository>,
        timeout: Duration,
    ) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn dispatch(
        &self,
        ticket: &SubmissionTicket,
    ) -> Result<(), SubmissionError> {
        let record = ticket.record();
        info!(ticket = ticket.id(), user_id = %record.user_id, "submitting application");

        let result = match tokio::time::timeout(self.timeout, self.repository.submit(record)).await {
            Ok(result) => result.map_err(SubmissionError::from),
            Err(_) => Err(SubmissionError::TimedOut(self.timeout)),
        };

        match &result {
            Ok(()) => info!(ticket = ticket.id(), "application stored"),
            Err(error) => warn!(ticket = ticket.id(), %error, "application submission failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::InMemoryApplicationRepository;
    use crate::models::FormData;

    fn ticket() -> SubmissionTicket {
        SubmissionTicket::new(1, ApplicationRecord::new("u1", "u1", FormData::default()))
    }

    #[test]
    fn only_idle_and_failed_accept_input() {
        assert!(UiState::Idle.accepts_input());
        assert!(UiState::Failed { message: "x".into() }.accepts_input());
        assert!(!UiState::Submitting.accepts_input());
        assert!(!UiState::Success.accepts_input());
    }

    #[tokio::test]
    async fn dispatch_writes_exactly_once() {
        let repo = Arc::new(InMemoryApplicationRepository::new());
        let trigger = SubmissionTrigger::new(repo.clone(), Duration::from_secs(1));

        trigger.dispatch(&ticket()).await.unwrap();

        assert_eq!(repo.submit_calls(), 1);
        assert!(repo.get_application("u1").await.is_ok());
    }

    #[tokio::test]
    async fn repository_errors_are_wrapped() {
        let repo = Arc::new(InMemoryApplicationRepository::new());
        repo.fail_with(Some(RepositoryError::Database("disk full".into())))
            .await;
        let trigger = SubmissionTrigger::new(repo.clone(), Duration::from_secs(1));

        assert_eq!(
            trigger.dispatch(&ticket()).await,
            Err(SubmissionError::Repository(RepositoryError::Database(
                "disk full".into()
            )))
        );
        assert_eq!(repo.submit_calls(), 1);
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let repo = Arc::new(
            InMemoryApplicationRepository::new().with_latency(Duration::from_millis(500)),
        );
        let trigger = SubmissionTrigger::new(repo.clone(), Duration::from_millis(10));

        assert_eq!(
            trigger.dispatch(&ticket()).await,
            Err(SubmissionError::TimedOut(Duration::from_millis(10)))
        );
        assert!(repo.is_empty().await);
    }
}
