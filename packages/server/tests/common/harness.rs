//! Test harness with testcontainers for integration testing.
//!
//! A single Postgres container is shared across all tests; migrations and
//! seeding run once on first use. Each test gets a fresh pool.

use anyhow::{Context, Result};
use axum::Router;
use sqlx::PgPool;
use std::sync::Arc;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

use server_core::domains::auth::{MockOtpSender, OtpConfig, OtpSender, TokenService};
use server_core::domains::authz::seed_defaults;
use server_core::server::app::build_app;

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Respect RUST_LOG; try_init avoids panicking if already set up.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations and seeding once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        seed_defaults(&pool)
            .await
            .context("Failed to seed roles and permissions")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Each test gets a fresh pool against the shared container's database.
pub struct TestHarness {
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        Ok(Self { db_pool })
    }

    /// Token service matching the one wired into [`Self::app`].
    pub fn token_service(&self) -> Arc<TokenService> {
        Arc::new(TokenService::new(
            "test_secret_key",
            "test_issuer".to_string(),
        ))
    }

    /// Router wired with the given mock sender.
    pub fn app_with_sender(&self, sender: Arc<MockOtpSender>) -> (Router, Arc<TokenService>) {
        let tokens = self.token_service();
        let router = build_app(
            self.db_pool.clone(),
            tokens.clone(),
            sender as Arc<dyn OtpSender>,
            OtpConfig::default(),
        );
        (router, tokens)
    }

    /// Router wired with a fresh mock sender; returns the sender so tests
    /// can inspect delivered codes and recipients.
    pub fn app(&self) -> (Router, Arc<MockOtpSender>, Arc<TokenService>) {
        let sender = Arc::new(MockOtpSender::new());
        let (router, tokens) = self.app_with_sender(sender.clone());
        (router, sender, tokens)
    }
}
