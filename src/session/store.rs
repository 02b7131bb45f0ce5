//! Persistent refresh-token sessions.
//!
//! One row per outstanding refresh token, keyed by the token's `jti`. The
//! schema allows at most one row per user; login replaces the previous row.
//! A row is valid only while `expires_at` is strictly in the future.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use crate::auth::Claims;
use crate::error::AppError;

/// A stored session row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub jti: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

/// Session about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub user_id: i64,
    pub jti: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl NewSession {
    /// Session tracking a refresh token, spanning its `iat..exp` window.
    ///
    /// # Errors
    /// Returns an internal error if the window is empty
    pub fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let created_at = claims.issued_at();
        let expires_at = claims.expires_at();
        if expires_at <= created_at {
            return Err(AppError::Internal(
                "Refresh token expires before it is issued".to_string(),
            ));
        }
        Ok(Self {
            user_id: claims.user_id,
            jti: claims.jti.clone(),
            created_at,
            expires_at,
        })
    }
}

#[derive(Clone)]
pub struct SessionStore {
    pool: PgPool,
}

impl SessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        Ok(self.pool.begin().await?)
    }

    /// Insert a session.
    ///
    /// # Errors
    /// `AppError::Conflict` if the user already has a row or the jti is taken
    pub async fn create(&self, session: &NewSession) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::create_in(&mut conn, session).await
    }

    /// [`SessionStore::create`] on a caller-owned connection or transaction.
    pub async fn create_in(conn: &mut PgConnection, session: &NewSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (user_id, jti, created_at, expires_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $3)
            "#,
        )
        .bind(session.user_id)
        .bind(&session.jti)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Insert a session, evicting whatever session the user had before.
    pub async fn replace_for_user(&self, session: &NewSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_sessions (user_id, jti, created_at, expires_at, last_seen_at)
            VALUES ($1, $2, $3, $4, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET jti = EXCLUDED.jti,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at,
                last_seen_at = EXCLUDED.last_seen_at
            "#,
        )
        .bind(session.user_id)
        .bind(&session.jti)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The session for `(user_id, jti)` if it is still valid at `now`.
    pub async fn find_valid(
        &self,
        user_id: i64,
        jti: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, jti, created_at, expires_at, last_seen_at
            FROM user_sessions
            WHERE user_id = $1 AND jti = $2 AND expires_at > $3
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Delete the valid session for `(user_id, jti)`.
    ///
    /// Returns whether a row was removed. Under concurrent calls with the same
    /// arguments only one caller observes `true`.
    pub async fn consume(
        conn: &mut PgConnection,
        user_id: i64,
        jti: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM user_sessions WHERE user_id = $1 AND jti = $2 AND expires_at > $3",
        )
        .bind(user_id)
        .bind(jti)
        .bind(now)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete a session by token id. Absence is not an error.
    pub async fn delete_by_token_id(&self, jti: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE jti = $1")
            .bind(jti)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every session that is no longer valid at `now`.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_for_user(&self, user_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_sessions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
