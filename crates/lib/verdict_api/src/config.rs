//! API server configuration.

use thiserror::Error;
use verdict_core::auth::password::DEFAULT_COST;
use verdict_core::origin::OriginError;

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// SQLite connection URL.
    pub database_url: String,
    /// JWT signing secret. Must be non-blank.
    pub jwt_secret: String,
    /// Comma-separated list of allowed cross-origin sources.
    pub allowed_origins: String,
    /// Production deployment: session cookies carry `Secure`.
    pub production: bool,
    /// bcrypt cost for new password hashes.
    pub bcrypt_cost: u32,
}

impl ApiConfig {
    /// Configuration with the given secret and origin list and defaults
    /// for everything else.
    pub fn new(jwt_secret: impl Into<String>, allowed_origins: impl Into<String>) -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".into(),
            database_url: "sqlite://verdict.db".into(),
            jwt_secret: jwt_secret.into(),
            allowed_origins: allowed_origins.into(),
            production: false,
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("jwt_secret", &"<redacted>")
            .field("allowed_origins", &self.allowed_origins)
            .field("production", &self.production)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Whether an `APP_ENV` value names a production deployment.
pub fn is_production_env(app_env: &str) -> bool {
    matches!(
        app_env.trim().to_ascii_lowercase().as_str(),
        "production" | "prod"
    )
}

/// Fatal startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET is required")]
    MissingSecret,

    #[error("invalid CORS_ALLOWED_ORIGINS: {0}")]
    Origins(#[from] OriginError),

    #[error("password hasher: {0}")]
    Hasher(String),
}
