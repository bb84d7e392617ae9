//! PostgreSQL pool and schema bootstrap
//!
//! Only the PostgreSQL store needs this module; the in-memory store never
//! touches a pool.

use crate::config::DatabaseConfig;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Pool timeouts, kept separate from the user-facing database config
#[derive(Debug, Clone)]
pub struct PoolTimeouts {
    pub min_connections: u32,
    pub acquire: Duration,
    pub idle: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolTimeouts {
    fn default() -> Self {
        Self {
            min_connections: 1,
            acquire: Duration::from_secs(30),
            idle: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// Open a pool for the configured database
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    connect_with_timeouts(config, &PoolTimeouts::default()).await
}

/// Open a pool with explicit timeouts
pub async fn connect_with_timeouts(
    config: &DatabaseConfig,
    timeouts: &PoolTimeouts,
) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.url)
        .context("Invalid database URL")?
        .application_name("wellness-tracker");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(timeouts.min_connections.min(config.max_connections))
        .acquire_timeout(timeouts.acquire)
        .idle_timeout(timeouts.idle)
        .max_lifetime(timeouts.max_lifetime)
        .test_before_acquire(true)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    info!(
        max = config.max_connections,
        min = timeouts.min_connections,
        "Database pool ready"
    );

    Ok(pool)
}

/// Apply the bundled schema in `backend/migrations`
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply schema")?;
    info!("Database schema is up to date");
    Ok(())
}

/// Round-trip a trivial query
pub async fn health_check(pool: &PgPool) -> Result<()> {
    if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
        warn!(error = %e, "Database health check failed");
        return Err(e.into());
    }
    Ok(())
}
