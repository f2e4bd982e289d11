//! Origin gate — applies [`AllowedOrigins::decide`] to every request.
//!
//! - `Deny`: disallowed preflight, answered 403 here.
//! - any other `OPTIONS`: answered 204 here, never reaching a handler.
//! - `Allow(origin)`: CORS headers echo `origin` (never `*`).
//! - `Ignore`: the request proceeds with no CORS headers.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;
use verdict_core::origin::{AllowedOrigins, CorsDecision};

use crate::error::AppError;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const VARY_ON: [&str; 3] = [
    "Origin",
    "Access-Control-Request-Method",
    "Access-Control-Request-Headers",
];

/// Axum middleware enforcing the origin allow-list.
pub async fn gate(
    State(origins): State<Arc<AllowedOrigins>>,
    request: Request,
    next: Next,
) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    // Lossy decode: a non-ASCII origin must fail normalisation, not read as absent.
    let origin = request
        .headers()
        .get(ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let decision = origins.decide(origin.as_deref(), is_preflight);

    if decision == CorsDecision::Deny {
        debug!(origin = ?origin, "preflight rejected: origin not allowed");
        return AppError::Forbidden("CORS origin denied".into()).into_response();
    }

    let mut response = if is_preflight {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if let CorsDecision::Allow(origin) = decision {
        apply_cors_headers(response.headers_mut(), &origin);
    }
    response
}

/// Set the CORS response headers for an allowed origin.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: &str) {
    for value in VARY_ON {
        append_vary(headers, value);
    }
    if let Ok(origin) = HeaderValue::from_str(origin) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
}

/// Add `value` to `Vary` unless some existing `Vary` entry already names it
/// (case-insensitive, across comma-separated lists).
pub fn append_vary(headers: &mut HeaderMap, value: &'static str) {
    let present = headers
        .get_all(VARY)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|part| part.trim().eq_ignore_ascii_case(value));
    if !present {
        headers.append(VARY, HeaderValue::from_static(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vary_values(headers: &HeaderMap) -> Vec<String> {
        headers
            .get_all(VARY)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn vary_is_deduplicated_case_insensitively() {
        let mut headers = HeaderMap::new();
        headers.append(VARY, HeaderValue::from_static("accept-encoding, origin"));

        append_vary(&mut headers, "Origin");
        append_vary(&mut headers, "Access-Control-Request-Method");
        append_vary(&mut headers, "Access-Control-Request-Method");

        assert_eq!(
            vary_values(&headers),
            ["accept-encoding, origin", "Access-Control-Request-Method"]
        );
    }

    #[test]
    fn applying_twice_adds_each_vary_once() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers, "http://localhost:4200");
        apply_cors_headers(&mut headers, "http://localhost:4200");

        assert_eq!(vary_values(&headers).len(), 3);
        assert_eq!(
            headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:4200"
        );
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_METHODS).unwrap(), ALLOW_METHODS);
        assert_eq!(headers.get(ACCESS_CONTROL_ALLOW_HEADERS).unwrap(), ALLOW_HEADERS);
    }
}
