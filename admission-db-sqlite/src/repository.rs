use std::{str::FromStr, sync::LazyLock};

use admission_core::{
    ApplicationRecord, ApplicationRepository, FieldName, FormData, RepositoryError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    Row,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
};
use tracing::debug;

/// `INSERT ... ON CONFLICT DO UPDATE` covering every form column, built once
/// from [`FieldName::ALL`] so the statement and the field table cannot drift.
static UPSERT_SQL: LazyLock<String> = LazyLock::new(|| {
    let columns: Vec<&str> = FieldName::ALL.iter().map(FieldName::as_str).collect();
    let placeholders = vec!["?"; columns.len() + 3].join(", ");
    let updates = ["submitted_by", "submitted_at"]
        .iter()
        .copied()
        .chain(columns.iter().copied())
        .map(|c| format!("{c} = excluded.{c}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO applications (user_id, submitted_by, submitted_at, {}) VALUES ({}) \
         ON CONFLICT(user_id) DO UPDATE SET {}",
        columns.join(", "),
        placeholders,
        updates
    )
});

pub struct SqliteApplicationRepository {
    pool: SqlitePool,
}

impl SqliteApplicationRepository {
    /// Opens `connection_string`.
    ///
    /// * A bare file path (e.g. `"admissions.db"`) is created if missing.
    /// * `":memory:"` opens a private in-memory database held by a single
    ///   pooled connection.
    /// * Anything starting with `sqlite:` is handed to sqlx unchanged.
    pub async fn new(connection_string: &str) -> Result<Self, RepositoryError> {
        let connection_error = |e: sqlx::Error| RepositoryError::Connection(e.to_string());

        let pool = if connection_string == ":memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
                .map_err(connection_error)?
        } else if connection_string.starts_with("sqlite:") {
            let options =
                SqliteConnectOptions::from_str(connection_string).map_err(connection_error)?;
            SqlitePool::connect_with(options)
                .await
                .map_err(connection_error)?
        } else {
            let options = SqliteConnectOptions::new()
                .filename(connection_string)
                .create_if_missing(true);
            SqlitePool::connect_with(options)
                .await
                .map_err(connection_error)?
        };

        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("migration failed: {e}")))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn row_to_record(row: &SqliteRow) -> Result<ApplicationRecord, RepositoryError> {
    let text = |column: &str| -> Result<String, RepositoryError> {
        row.try_get::<String, _>(column)
            .map_err(|e| RepositoryError::Database(format!("Failed to get {column}: {e}")))
    };

    let mut values = Vec::with_capacity(FieldName::ALL.len());
    for field in FieldName::ALL {
        values.push((field.as_str(), text(field.as_str())?));
    }

    Ok(ApplicationRecord {
        user_id: text("user_id")?,
        submitted_by: text("submitted_by")?,
        submitted_at: row
            .try_get::<DateTime<Utc>, _>("submitted_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get submitted_at: {e}")))?,
        data: FormData::from_record(values),
    })
}

#[async_trait]
impl ApplicationRepository for SqliteApplicationRepository {
    async fn submit(
        &self,
        record: &ApplicationRecord,
    ) -> Result<(), RepositoryError> {
        let mut query = sqlx::query(UPSERT_SQL.as_str())
            .bind(record.user_id.as_str())
            .bind(record.submitted_by.as_str())
            .bind(record.submitted_at);
        for (_, value) in record.data.iter() {
            query = query.bind(value);
        }

        query
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        debug!(user_id = %record.user_id, "application row written");
        Ok(())
    }

    async fn get_application(
        &self,
        user_id: &str,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let row = sqlx::query("SELECT * FROM applications WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?
            .ok_or(RepositoryError::NotFound)?;

        row_to_record(&row)
    }

    async fn list_applications(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM applications ORDER BY submitted_at, user_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        rows.iter().map(row_to_record).collect()
    }
}
