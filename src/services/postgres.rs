use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Review state of a job application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
}

/// PostgreSQL client for seeker activity
///
/// Tracks which jobs a seeker applied to and what they searched for.
/// Recommendations exclude applied jobs and score against recent searches.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool; migrations are the caller's concern
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Record that a seeker applied to a job
    ///
    /// Re-applying resets the application to pending.
    pub async fn record_application(
        &self,
        seeker_id: &str,
        job_id: &str,
    ) -> Result<uuid::Uuid, PostgresError> {
        let query = r#"
            INSERT INTO job_applications (id, seeker_id, job_id, status, applied_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (seeker_id, job_id)
            DO UPDATE SET
                status = EXCLUDED.status,
                applied_at = EXCLUDED.applied_at
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(uuid::Uuid::new_v4())
            .bind(seeker_id)
            .bind(job_id)
            .bind(ApplicationStatus::Pending)
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Recorded application: {} -> {}", seeker_id, job_id);

        Ok(row.get("id"))
    }

    /// Job IDs the seeker has applied to, most recent first
    pub async fn get_application_history(&self, seeker_id: &str) -> Result<Vec<String>, PostgresError> {
        let query = r#"
            SELECT job_id
            FROM job_applications
            WHERE seeker_id = $1
            ORDER BY applied_at DESC
        "#;

        let rows = sqlx::query(query).bind(seeker_id).fetch_all(&self.pool).await?;

        let job_ids: Vec<String> = rows.iter().map(|row| row.get("job_id")).collect();

        tracing::debug!("Seeker {} has applied to {} jobs", seeker_id, job_ids.len());

        Ok(job_ids)
    }

    /// Withdraw an application
    pub async fn withdraw_application(&self, seeker_id: &str, job_id: &str) -> Result<bool, PostgresError> {
        let query = r#"
            DELETE FROM job_applications
            WHERE seeker_id = $1 AND job_id = $2
        "#;

        let result = sqlx::query(query)
            .bind(seeker_id)
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Record a search term
    pub async fn record_search(&self, seeker_id: &str, term: &str) -> Result<uuid::Uuid, PostgresError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(PostgresError::InvalidInput("search term is empty".to_string()));
        }

        let id = uuid::Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO search_history (id, seeker_id, term, searched_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(id)
        .bind(seeker_id)
        .bind(term)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Latest distinct search terms (lower-cased), most recent first
    pub async fn recent_search_terms(
        &self,
        seeker_id: &str,
        limit: usize,
    ) -> Result<Vec<String>, PostgresError> {
        let query = r#"
            SELECT term
            FROM (
                SELECT LOWER(term) AS term, MAX(searched_at) AS last_searched
                FROM search_history
                WHERE seeker_id = $1
                GROUP BY LOWER(term)
            ) terms
            ORDER BY last_searched DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(seeker_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("term")).collect())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
