//! Authentication: credential hashing, session tokens and the users table.
//!
//! Provides password hashing, JWT issuance/verification, email
//! normalisation and the user queries shared by `verdict_api`.

pub mod email;
pub mod jwt;
pub mod password;
pub mod queries;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::auth::{IssuedToken, User};
use jwt::TokenService;
use password::PasswordHasher;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Email already registered")]
    Conflict,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Malformed token claims: {0}")]
    MalformedToken(String),

    #[error("Signing secret is not configured")]
    MissingSecret,

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Register a new account. The email is normalised before it is stored.
pub async fn signup(
    pool: &SqlitePool,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let email = email::normalize(email);
    if !email::is_valid(&email) {
        return Err(AuthError::ValidationError("Invalid email format".into()));
    }
    if password.is_empty() {
        return Err(AuthError::ValidationError("Password is required".into()));
    }

    let hash = hasher.hash(password)?;
    let user = queries::create_user(pool, &email, &hash).await?;
    info!(user_id = user.id, "user registered");
    Ok(user)
}

/// Authenticate with email + password and issue a session token.
///
/// Unknown emails and wrong passwords produce the same
/// [`AuthError::CredentialError`].
pub async fn login(
    pool: &SqlitePool,
    hasher: &PasswordHasher,
    tokens: &TokenService,
    email: &str,
    password: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<(User, IssuedToken), AuthError> {
    let email = email::normalize(email);
    if !email::is_valid(&email) {
        return Err(AuthError::ValidationError("Invalid email format".into()));
    }

    let Some(stored) = queries::find_user_by_email(pool, &email).await? else {
        // Pay for one bcrypt verification so both branches cost the same.
        hasher.verify_dummy(password);
        debug!("login rejected: unknown email");
        return Err(AuthError::CredentialError);
    };

    if !hasher.verify(password, &stored.password_hash)? {
        debug!(user_id = stored.user.id, "login rejected: wrong password");
        return Err(AuthError::CredentialError);
    }

    let issued = tokens.issue(&(&stored.user).into(), now)?;
    info!(user_id = stored.user.id, "user logged in");
    Ok((stored.user, issued))
}
