mod config;
mod db;
mod error;
mod models;
mod routes;
mod static_files;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::AppConfig;
use db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    if config.dev_mode {
        tracing::warn!(
            role = config.dev_user_role.key(),
            "Running in DEV MODE - authentication is bypassed!"
        );
    }

    // TLS is required by hosted Postgres providers
    let pool = db::build_pool(&config.database_url, config.pool_size)?;

    let addr = format!("0.0.0.0:{}", config.port);
    let app = routes::router(Arc::new(AppState { pool, config }));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
