//! Session and user rows.
//!
//! Both tables belong to the external identity service. Production code only
//! reads sessions; the write helpers exist for seeding and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use ticklist_core::{Error, Result, SessionValidator};

/// PostgreSQL-backed session lookup.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: Pool<Postgres>,
}

impl PgSessionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a session for `user_id`.
    pub async fn create(
        &self,
        user_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions (id, token, user_id, expires_at, created_at)
             VALUES ($1, $2, $3, $4, NOW())",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl SessionValidator for PgSessionRepository {
    async fn validate(&self, token: &str) -> Result<Option<String>> {
        let user_id: Option<String> = sqlx::query_scalar(
            "SELECT user_id FROM sessions WHERE token = $1 AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if user_id.is_none() {
            debug!(
                subsystem = "database",
                component = "sessions",
                op = "validate",
                "Session token unknown or expired"
            );
        }
        Ok(user_id)
    }
}

/// PostgreSQL user rows.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a user, or refresh name and email when the id exists.
    pub async fn upsert(&self, id: &str, name: &str, email: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, name, email, created_at) VALUES ($1, $2, $3, NOW())
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }

    /// Delete a user and, by cascade, everything they own.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
