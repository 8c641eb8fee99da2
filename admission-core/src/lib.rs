pub mod config;
pub mod db;
pub mod form;
pub mod models;
pub mod navigation;
pub mod submission;
pub mod utils;
pub mod validation;

pub use config::{FormConfig, ValidationPolicy};
pub use db::repository::{ApplicationRepository, RepositoryError};
pub use db::session::{SessionProvider, StaticSession};
pub use form::{ApplicationForm, FormError, NavOutcome};
pub use models::*;
pub use navigation::{Controls, NavAction};
pub use submission::{SubmissionError, SubmissionTicket, SubmissionTrigger, UiState};
pub use validation::{Validator, validate_step};
