// Main entry point for the WellSync API server

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sadeem::{SadeemOptions, SadeemService};
use server_core::domains::auth::{OtpSender, SadeemSender, TokenService};
use server_core::domains::authz::seed_defaults;
use server_core::server::app::build_app;
use server_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting WellSync auth API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Default roles, permissions, and admin grants (idempotent)
    seed_defaults(&pool)
        .await
        .context("Failed to seed default roles and permissions")?;

    let tokens = Arc::new(TokenService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
    ));
    let sender: Arc<dyn OtpSender> = Arc::new(SadeemSender::new(Arc::new(SadeemService::new(
        SadeemOptions {
            api_token: config.otp_api_token.clone(),
            base_url: config.otp_base_url.clone(),
            test_mode: config.otp_test_mode,
        },
    ))));

    // Build application
    let app = build_app(pool, tokens, sender, config.otp_config());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
