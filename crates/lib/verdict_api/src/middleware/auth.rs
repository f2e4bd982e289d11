//! Authentication middleware — session token extraction and verification.
//!
//! The token is read from the `token` cookie first and from
//! `Authorization: Bearer <token>` only when the cookie is absent or empty.
//! A verified identity is attached to the request's own extensions and
//! read back by handlers through the [`AuthenticatedUser`] extractor.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use chrono::Utc;
use tracing::debug;
use verdict_core::models::auth::Identity;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::TOKEN_COOKIE;

/// Verified identity of the caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".into()))
    }
}

/// Find a non-empty session token: cookie first, then bearer header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Axum middleware: verifies the session token and injects
/// [`AuthenticatedUser`] into request extensions. Downstream handlers never
/// run for unauthenticated requests.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(request.headers()).ok_or_else(|| {
        debug!("request rejected: no session token");
        AppError::Unauthorized("Unauthorized".into())
    })?;

    let identity = state.tokens.verify(&token, Utc::now()).map_err(|e| {
        debug!(reason = %e, "request rejected: token verification failed");
        AppError::from(e)
    })?;

    request.extensions_mut().insert(AuthenticatedUser(identity));
    Ok(next.run(request).await)
}
