use std::sync::Arc;

use admission_core::db::{MemoryRepositoryFactory, RepositoryRegistry};
use admission_core::{ApplicationForm, SessionProvider};
use admission_db_sqlite::SqliteRepositoryFactory;
use anyhow::{Context, Result};
use tracing::debug;

use crate::config::AppConfig;

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

/// Connects to the configured backend and returns a fresh form for `session`.
pub async fn open_form(
    config: &AppConfig,
    session: Arc<dyn SessionProvider>,
) -> Result<ApplicationForm> {
    debug!(backend = %config.database.backend, "opening application store");
    let repo = build_registry()
        .create(&config.database)
        .await
        .with_context(|| {
            format!(
                "cannot open '{}' backend at '{}'",
                config.database.backend, config.database.connection_string
            )
        })?;

    Ok(ApplicationForm::new(
        Arc::from(repo),
        session,
        config.form.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use admission_core::StaticSession;
    use admission_core::db::DbConfig;

    use super::*;

    #[test]
    fn registry_knows_sqlite_and_memory() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn unknown_backend_is_reported_with_context() {
        let config = AppConfig {
            database: DbConfig {
                backend: "firestore".to_string(),
                connection_string: "x".to_string(),
            },
            ..AppConfig::default()
        };

        let err = open_form(&config, Arc::new(StaticSession::anonymous()))
            .await
            .err()
            .expect("unknown backend should fail");
        let chain = format!("{err:#}");
        assert!(chain.contains("firestore"));
        assert!(chain.contains("available"));
    }
}
