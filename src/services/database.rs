//! Postgres-backed implementations of the store traits.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::models::{User, VerificationCode};
use crate::services::store::{CodeStore, UserStore};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and wrap it.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        tracing::info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(&config.url)
            .await?;

        tracing::info!("Successfully connected to PostgreSQL");

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations completed");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, email, password_hash, role_code, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl CodeStore for Database {
    async fn save(&self, code: &VerificationCode) -> Result<(), anyhow::Error> {
        sqlx::query(
            "INSERT INTO verification_codes \
             (code_id, user_id, code, expires_at, consumed, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(code.code_id)
        .bind(code.user_id)
        .bind(&code.code)
        .bind(code.expires_at)
        .bind(code.consumed)
        .bind(code.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_unconsumed(
        &self,
        code: &str,
        user_id: Uuid,
    ) -> Result<Option<VerificationCode>, anyhow::Error> {
        let record = sqlx::query_as::<_, VerificationCode>(
            "SELECT code_id, user_id, code, expires_at, consumed, created_at \
             FROM verification_codes \
             WHERE code = $1 AND user_id = $2 AND consumed = FALSE \
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(code)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    // The unconsumed guard in the WHERE clause is what serializes racing
    // verifications: at most one caller sees a transitioned row.
    async fn consume(&self, code_id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE verification_codes SET consumed = TRUE \
             WHERE code_id = $1 AND consumed = FALSE",
        )
        .bind(code_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
