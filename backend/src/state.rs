//! Application state management
//!
//! `AppState` picks the store once from configuration and wires every
//! service onto it. Cloning is cheap: services hold `Arc` handles and the
//! pool is internally reference counted.

use crate::config::{AppConfig, StorageBackend};
use crate::db;
use crate::repositories::{MemoryStore, PgHealthRepository, PgPlanRepository, PgUserRepository};
use crate::services::{BmiPlanPolicy, HealthSystem};
use anyhow::Result;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Present only when running on PostgreSQL
    pub db: Option<PgPool>,
    pub config: Arc<AppConfig>,
    pub system: HealthSystem,
}

impl AppState {
    /// Build the state for the configured storage backend
    ///
    /// For PostgreSQL this opens the pool and applies the schema.
    pub async fn connect(config: AppConfig) -> Result<Self> {
        match config.storage.backend {
            StorageBackend::Memory => Ok(Self::in_memory(config)),
            StorageBackend::Postgres => {
                let pool = db::connect(&config.database).await?;
                db::run_migrations(&pool).await?;
                let policy = Arc::new(BmiPlanPolicy::new(config.plans.default_duration_days));

                let system = HealthSystem::new(
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgHealthRepository::new(pool.clone())),
                    Arc::new(PgPlanRepository::new(pool.clone())),
                    policy,
                );
                info!(backend = "postgres", "Application state ready");

                Ok(Self {
                    db: Some(pool),
                    config: Arc::new(config),
                    system,
                })
            }
        }
    }

    /// Build the state over a fresh in-memory store, ignoring the configured backend
    pub fn in_memory(config: AppConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let policy = Arc::new(BmiPlanPolicy::new(config.plans.default_duration_days));
        let system = HealthSystem::new(store.clone(), store.clone(), store, policy);
        info!(backend = "memory", "Application state ready");

        Self {
            db: None,
            config: Arc::new(config),
            system,
        }
    }

    #[inline]
    pub fn system(&self) -> &HealthSystem {
        &self.system
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_needs_no_database() {
        let state = AppState::connect(AppConfig::in_memory()).await.unwrap();
        assert!(state.db.is_none());
        assert_eq!(state.config().plans.default_duration_days, 30);
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let state = AppState::in_memory(AppConfig::in_memory());
        let cloned = state.clone();

        state
            .system()
            .users
            .register(wellness_tracker_shared::types::RegisterRequest {
                username: "ivan".to_string(),
                email: "ivan@example.com".to_string(),
                phone: None,
                password: "correctpw".to_string(),
            })
            .await
            .unwrap();

        assert!(cloned.system().users.find_user("ivan").await.is_ok());
    }
}
