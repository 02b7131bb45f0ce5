//! User and profile records.

use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, ConflictError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserDetail {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
}

/// Public profile returned by login, refresh and `/users/me`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserProfile {
    pub fn new(user: &User, detail: UserDetail) -> Self {
        Self {
            id: user.id,
            first_name: detail.first_name,
            last_name: detail.last_name,
            email: user.email.clone(),
        }
    }
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT id, email, password_hash FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_detail(pool: &PgPool, user_id: i64) -> Result<Option<UserDetail>, AppError> {
    let detail = sqlx::query_as::<_, UserDetail>(
        "SELECT user_id, first_name, last_name FROM user_details WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(detail)
}

/// Insert a user and their profile in one transaction. Returns the new id.
///
/// # Errors
/// `ConflictError::UserExists` if the email is already registered
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await?;

    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => AppError::Conflict(ConflictError::UserExists),
        other => other,
    })?;

    sqlx::query("INSERT INTO user_details (user_id, first_name, last_name) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(first_name)
        .bind(last_name)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user_id)
}
