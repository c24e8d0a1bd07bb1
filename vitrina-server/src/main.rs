//! vitrina-server — multi-tenant storefront content service
//!
//! Long-running service that:
//! - Manages seller catalogues, products and categories (JWT authenticated)
//! - Serves public storefront views by catalogue slug
//! - Validates, transcodes and stores product image uploads

mod api;
mod auth;
mod config;
mod db;
mod error;
mod services;
mod state;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrina_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting vitrina-server (env: {})", config.environment);

    let state = AppState::new(config.clone()).await?;
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("vitrina-server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
