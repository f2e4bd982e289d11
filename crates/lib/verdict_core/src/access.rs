//! Resource-level access errors and requester resolution.
//!
//! Every workspace and decision operation starts from a verified
//! [`Identity`] and re-resolves it against the `users` table, so a token
//! for a user that no longer exists is refused.

use sqlx::SqlitePool;
use thiserror::Error;

use crate::auth::{email, queries};
use crate::models::auth::Identity;

/// Authorization and mutation errors.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The requester's identity no longer resolves to a user row.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),
}

/// Resolve the requester's numeric user ID from the email in its token.
pub async fn resolve_requester(pool: &SqlitePool, identity: &Identity) -> Result<i64, AccessError> {
    queries::find_user_id_by_email(pool, &email::normalize(&identity.email))
        .await?
        .ok_or(AccessError::Unauthorized)
}

/// Trim a required text field, rejecting it if nothing is left.
pub(crate) fn required(value: &str, field: &str) -> Result<String, AccessError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AccessError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn resolves_existing_user_case_insensitively() {
        let pool = db::in_memory().await.unwrap();
        let user = queries::create_user(&pool, "gina@example.com", "h")
            .await
            .unwrap();
        let identity = Identity {
            user_id: user.id,
            email: "Gina@Example.com".into(),
        };
        assert_eq!(resolve_requester(&pool, &identity).await.unwrap(), user.id);
    }

    #[tokio::test]
    async fn unknown_user_is_unauthorized() {
        let pool = db::in_memory().await.unwrap();
        let identity = Identity {
            user_id: 99,
            email: "ghost@example.com".into(),
        };
        assert!(matches!(
            resolve_requester(&pool, &identity).await,
            Err(AccessError::Unauthorized)
        ));
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("  hi ", "Title").unwrap(), "hi");
        let err = required(" \t ", "Title").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Title cannot be empty");
    }
}
