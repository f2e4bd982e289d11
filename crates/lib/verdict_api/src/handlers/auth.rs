//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CredentialsRequest, LoginResponse, UserResponse};
use crate::services::cookies::token_cookie;

/// `POST /api/signup` — create a new user account.
pub async fn signup_handler(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user =
        verdict_core::auth::signup(&state.pool, &state.passwords, &body.email, &body.password)
            .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// `POST /api/login` — authenticate with email + password.
///
/// Sets the session cookie and also returns the token for non-browser clients.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    ApiJson(body): ApiJson<CredentialsRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (_user, issued) = verdict_core::auth::login(
        &state.pool,
        &state.passwords,
        &state.tokens,
        &body.email,
        &body.password,
        Utc::now(),
    )
    .await?;

    let cookie = token_cookie(&issued.token, issued.expires_at, state.config.production);
    Ok((jar.add(cookie), Json(issued.into())))
}

/// `GET /api/protected` — echo the caller's identity.
pub async fn protected_handler(AuthenticatedUser(identity): AuthenticatedUser) -> String {
    format!("Hello, {}", identity.email)
}
