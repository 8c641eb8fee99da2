use async_trait::async_trait;
use thiserror::Error;

use crate::models::ApplicationRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Backend store for submitted applications.
///
/// Implementations must write a record atomically: after `submit` returns
/// `Ok`, the full record is stored; after an error, nothing for that call is.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Upsert keyed by `record.user_id`.
    async fn submit(
        &self,
        record: &ApplicationRecord,
    ) -> Result<(), RepositoryError>;

    async fn get_application(
        &self,
        user_id: &str,
    ) -> Result<ApplicationRecord, RepositoryError>;

    /// All stored applications, oldest submission first.
    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}
