//! Verdict API server binary.
//!
//! Reads configuration from flags and the environment (a `.env` file is
//! honoured), opens the SQLite database, applies migrations and serves the
//! HTTP API. A missing signing secret or origin list aborts startup.

use clap::Parser;
use thiserror::Error;
use tracing::info;
use verdict_api::config::{ApiConfig, ConfigError, is_production_env};
use verdict_core::auth::password::DEFAULT_COST;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "verdict_api_server", about = "Verdict API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// SQLite connection URL.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://verdict.db")]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Token signing secret.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true, default_value = "")]
    jwt_secret: String,

    /// Comma-separated list of allowed CORS origins.
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", default_value = "")]
    cors_allowed_origins: String,

    /// Deployment environment; `production`/`prod` marks session cookies `Secure`.
    #[arg(long, env = "APP_ENV", default_value = "development")]
    app_env: String,

    /// bcrypt cost for new password hashes.
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_COST)]
    bcrypt_cost: u32,
}

/// Startup failures.
#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] verdict_core::db::DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,verdict_api=debug,verdict_core=debug")
            }),
        )
        .init();

    let args = Args::parse();

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        database_url: args.database_url,
        jwt_secret: args.jwt_secret,
        allowed_origins: args.cors_allowed_origins,
        production: is_production_env(&args.app_env),
        bcrypt_cost: args.bcrypt_cost,
    };

    info!(
        database_url = %config.database_url,
        max_connections = args.max_connections,
        "opening database"
    );
    let pool = verdict_core::db::connect(&config.database_url, args.max_connections).await?;

    let bind_addr = config.bind_addr.clone();
    let state = verdict_api::AppState::new(pool, config)?;
    info!(
        origins = ?state.origins.iter().collect::<Vec<_>>(),
        production = state.config.production,
        "configuration loaded"
    );
    let app = verdict_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
