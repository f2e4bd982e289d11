//! # verdict_api
//!
//! HTTP API library for Verdict.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use verdict_core::auth::jwt::TokenService;
use verdict_core::auth::password::PasswordHasher;
use verdict_core::origin::AllowedOrigins;

use crate::config::{ApiConfig, ConfigError};
use crate::handlers::{auth, decisions, health, workspaces};

/// Shared application state passed to all handlers.
///
/// Everything except the pool is built once from [`ApiConfig`] and is
/// read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool.
    pub pool: SqlitePool,
    /// API configuration.
    pub config: ApiConfig,
    /// Session token signer/verifier.
    pub tokens: Arc<TokenService>,
    /// Password hasher.
    pub passwords: Arc<PasswordHasher>,
    /// Cross-origin allow-list.
    pub origins: Arc<AllowedOrigins>,
}

impl AppState {
    /// Build state from configuration, failing on a missing secret or an
    /// unusable origin list.
    pub fn new(pool: SqlitePool, config: ApiConfig) -> Result<Self, ConfigError> {
        let tokens = TokenService::new(&config.jwt_secret).map_err(|_| ConfigError::MissingSecret)?;
        let origins = AllowedOrigins::from_csv(&config.allowed_origins)?;
        let passwords = PasswordHasher::new(config.bcrypt_cost)
            .map_err(|e| ConfigError::Hasher(e.to_string()))?;
        Ok(Self {
            pool,
            config,
            tokens: Arc::new(tokens),
            passwords: Arc::new(passwords),
            origins: Arc::new(origins),
        })
    }
}

/// Builds the Axum router with all routes and shared state.
///
/// Layering, outermost first: request tracing → origin gate → session
/// authentication (protected routes only) → handler.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/signup", post(auth::signup_handler))
        .route("/api/login", post(auth::login_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/protected", get(auth::protected_handler))
        .route(
            "/api/workspaces",
            post(workspaces::create_workspace_handler).get(workspaces::list_workspaces_handler),
        )
        .route(
            "/api/workspaces/{id}/members",
            post(workspaces::add_member_handler),
        )
        .route(
            "/api/workspaces/{id}/decisions",
            post(decisions::create_decision_handler),
        )
        .route(
            "/api/decisions/{id}",
            put(decisions::update_decision_handler).patch(decisions::update_decision_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum::middleware::from_fn_with_state(
            state.origins.clone(),
            middleware::cors::gate,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
