use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::memory::InMemoryApplicationRepository;
use super::repository::{ApplicationRepository, RepositoryError};

/// Which application store to open, and how.
///
/// `backend` names a registered [`RepositoryFactory`]; `connection_string`
/// is handed to it untouched (`admissions.db` or `:memory:` for `sqlite`,
/// ignored by `memory`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        }
    }
}

/// Opens one kind of application store.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    /// Key matched against [`DbConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Returns a store ready for submissions, with its schema in place.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError>;
}

/// The `memory` backend: a fresh [`InMemoryApplicationRepository`] per call.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &DbConfig,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError> {
        Ok(Box::new(InMemoryApplicationRepository::new()))
    }
}

/// Backends the running binary knows how to open.
#[derive(Default)]
pub struct RepositoryRegistry {
    factories: Vec<Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `factory`. A factory already registered under the same name is
    /// dropped.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        let name = factory.backend_name();
        self.factories.retain(|existing| existing.backend_name() != name);
        self.factories.push(factory);
    }

    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.iter().map(|f| f.backend_name()).collect();
        names.sort_unstable();
        names
    }

    /// Opens the store named by `config.backend`.
    ///
    /// An unregistered backend is a [`RepositoryError::Configuration`] that
    /// lists what is available.
    pub async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError> {
        let Some(factory) = self
            .factories
            .iter()
            .find(|f| f.backend_name() == config.backend)
        else {
            return Err(RepositoryError::Configuration(format!(
                "no '{}' backend; available: {}",
                config.backend,
                self.available_backends().join(", ")
            )));
        };
        factory.create(config).await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{ApplicationRecord, FieldName, FormData};

    fn memory_only() -> RepositoryRegistry {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(MemoryRepositoryFactory));
        registry
    }

    #[test]
    fn config_defaults_to_private_sqlite() {
        let cfg: DbConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, DbConfig::default());
        assert_eq!(cfg.connection_string, ":memory:");
    }

    #[test]
    fn registering_a_backend_twice_keeps_one_entry() {
        let mut registry = memory_only();
        registry.register(Box::new(MemoryRepositoryFactory));
        assert_eq!(registry.available_backends(), vec!["memory"]);
    }

    #[tokio::test]
    async fn memory_backend_accepts_submissions() {
        let config = DbConfig {
            backend: "memory".to_string(),
            ..DbConfig::default()
        };
        let repo = memory_only().create(&config).await.unwrap();

        let data = FormData::default().with_field(FieldName::FullName, "Aarav");
        repo.submit(&ApplicationRecord::new("parent-1", "parent-1", data))
            .await
            .unwrap();

        let stored = repo.get_application("parent-1").await.unwrap();
        assert_eq!(stored.data.get(FieldName::FullName), "Aarav");
    }

    #[tokio::test]
    async fn each_memory_store_starts_empty() {
        let config = DbConfig {
            backend: "memory".to_string(),
            ..DbConfig::default()
        };
        let registry = memory_only();
        let first = registry.create(&config).await.unwrap();
        first
            .submit(&ApplicationRecord::new("u1", "u1", FormData::default()))
            .await
            .unwrap();

        let second = registry.create(&config).await.unwrap();
        assert!(second.list_applications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unregistered_sqlite_is_a_configuration_error() {
        let err = memory_only()
            .create(&DbConfig::default())
            .await
            .err()
            .expect("sqlite is not registered in core");

        assert_eq!(
            err,
            RepositoryError::Configuration("no 'sqlite' backend; available: memory".to_string())
        );
    }
}
