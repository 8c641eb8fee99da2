use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FormData;

/// A submitted application as written to the backend.
///
/// One record exists per user id; a later submission for the same user
/// replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub user_id: String,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
    pub data: FormData,
}

impl ApplicationRecord {
    pub fn new(
        user_id: impl Into<String>,
        submitted_by: impl Into<String>,
        data: FormData,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            submitted_by: submitted_by.into(),
            submitted_at: Utc::now(),
            data,
        }
    }
}
