//! Auth-related database queries.

use sqlx::SqlitePool;

use super::AuthError;
use crate::models::auth::{User, UserWithPassword};
use crate::models::{from_micros, now_micros};

/// Fetch a user (with password hash) by normalised email.
pub async fn find_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, (i64, String, String, i64)>(
        "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, email, password_hash, created_at)| UserWithPassword {
        user: User {
            id,
            email,
            created_at: from_micros(created_at),
        },
        password_hash,
    }))
}

/// Resolve a normalised email to a user ID.
pub async fn find_user_id_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Create a new user. A duplicate email surfaces as [`AuthError::Conflict`].
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let created_at = now_micros();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(email)
    .bind(password_hash)
    .bind(created_at)
    .fetch_one(pool)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => AuthError::Conflict,
        _ => AuthError::DbError(e),
    })?;
    Ok(User {
        id,
        email: email.to_string(),
        created_at: from_micros(created_at),
    })
}
