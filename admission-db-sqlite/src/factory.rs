use admission_core::ApplicationRepository;
use admission_core::db::{DbConfig, RepositoryError, RepositoryFactory};
use async_trait::async_trait;

use crate::repository::SqliteApplicationRepository;

/// [`RepositoryFactory`] for SQLite.
///
/// Register this with an [`admission_core::db::RepositoryRegistry`] to make
/// the `"sqlite"` backend available:
///
/// ```rust,no_run
/// use admission_core::db::RepositoryRegistry;
/// use admission_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database described by `config.connection_string` and
    /// brings its schema up to date.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ApplicationRepository>, RepositoryError> {
        let repo = SqliteApplicationRepository::new(&config.connection_string).await?;
        repo.run_migrations().await?;
        Ok(Box::new(repo))
    }
}
