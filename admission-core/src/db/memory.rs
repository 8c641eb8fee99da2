use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::repository::{ApplicationRepository, RepositoryError};
use crate::models::ApplicationRecord;

/// HashMap-backed [`ApplicationRepository`].
///
/// Supports an artificial write latency and an injected failure so the
/// submission path can be exercised without a database.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    records: Mutex<HashMap<String, ApplicationRecord>>,
    failure: Mutex<Option<RepositoryError>>,
    latency: Option<Duration>,
    submit_calls: AtomicUsize,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `submit` sleeps for `latency` before writing.
    pub fn with_latency(
        mut self,
        latency: Duration,
    ) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes every subsequent `submit` fail with `error` until cleared.
    pub async fn fail_with(
        &self,
        error: Option<RepositoryError>,
    ) {
        *self.failure.lock().await = error;
    }

    /// Number of `submit` calls received, successful or not.
    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn submit(
        &self,
        record: &ApplicationRecord,
    ) -> Result<(), RepositoryError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(error) = self.failure.lock().await.clone() {
            return Err(error);
        }

        debug!(user_id = %record.user_id, "storing application in memory");
        self.records
            .lock()
            .await
            .insert(record.user_id.clone(), record.clone());
        Ok(())
    }

    async fn get_application(
        &self,
        user_id: &str,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.records
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let mut records: Vec<_> = self.records.lock().await.values().cloned().collect();
        records.sort_by(|a, b| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{FieldName, FormData};

    fn record(user: &str, name: &str) -> ApplicationRecord {
        ApplicationRecord::new(
            user,
            user,
            FormData::default().with_field(FieldName::FullName, name),
        )
    }

    #[tokio::test]
    async fn submit_upserts_by_user_id() {
        let repo = InMemoryApplicationRepository::new();
        repo.submit(&record("u1", "First")).await.unwrap();
        repo.submit(&record("u1", "Second")).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let stored = repo.get_application("u1").await.unwrap();
        assert_eq!(stored.data.get(FieldName::FullName), "Second");
        assert_eq!(repo.submit_calls(), 2);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let repo = InMemoryApplicationRepository::new();
        assert_eq!(
            repo.get_application("ghost").await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn injected_failure_writes_nothing() {
        let repo = InMemoryApplicationRepository::new();
        repo.fail_with(Some(RepositoryError::Connection("offline".into())))
            .await;

        let result = repo.submit(&record("u1", "A")).await;
        assert_eq!(result, Err(RepositoryError::Connection("offline".into())));
        assert!(repo.is_empty().await);

        repo.fail_with(None).await;
        repo.submit(&record("u1", "A")).await.unwrap();
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn list_is_ordered_by_submission_time() {
        let repo = InMemoryApplicationRepository::new();
        let mut early = record("b", "B");
        early.submitted_at -= chrono::Duration::minutes(5);
        repo.submit(&record("a", "A")).await.unwrap();
        repo.submit(&early).await.unwrap();

        let users: Vec<_> = repo
            .list_applications()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.user_id)
            .collect();
        assert_eq!(users, vec!["b".to_string(), "a".to_string()]);
    }
}
