//! Orchestrator over the individual services
//!
//! `HealthSystem` owns no persistence. Multi-step operations are plain
//! sequences of service calls: a failure stops the sequence and earlier
//! steps stay committed.

use super::{ExportService, HealthService, PlanPolicy, PlanService, UserService};
use crate::error::{ServiceError, ServiceResult};
use crate::repositories::{HealthRepository, PlanRepository, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use wellness_tracker_shared::models::{HealthRecord, Plan, User};
use wellness_tracker_shared::types::{RecordHealthRequest, RegisterRequest};

/// Entry point bundling every service
#[derive(Clone)]
pub struct HealthSystem {
    pub users: UserService,
    pub health: HealthService,
    pub plans: PlanService,
    pub export: ExportService,
    policy: Arc<dyn PlanPolicy>,
}

impl HealthSystem {
    pub fn new(
        users: Arc<dyn UserRepository>,
        health: Arc<dyn HealthRepository>,
        plans: Arc<dyn PlanRepository>,
        policy: Arc<dyn PlanPolicy>,
    ) -> Self {
        Self {
            users: UserService::new(users.clone()),
            health: HealthService::new(users.clone(), health.clone()),
            plans: PlanService::new(users.clone(), plans),
            export: ExportService::new(users, health),
            policy,
        }
    }

    /// Register a user, then store their first measurement
    ///
    /// If the measurement fails the user stays registered.
    pub async fn create_user_with_health_data(
        &self,
        registration: RegisterRequest,
        measurement: RecordHealthRequest,
    ) -> ServiceResult<(User, HealthRecord)> {
        let user = self.users.register(registration).await?;
        let record = self
            .health
            .record_health_data(&user.username, measurement)
            .await?;

        Ok((user, record))
    }

    /// Create a plan suited to the user's latest measurement
    pub async fn generate_health_plan(&self, username: &str) -> ServiceResult<Plan> {
        let record = self
            .health
            .latest_record(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No health data recorded".to_string()))?;

        let request = self.policy.plan_for(&record, Utc::now());
        let plan = self.plans.create_plan(username, request).await?;

        info!(
            plan_id = %plan.id,
            plan_type = plan.plan_type.as_str(),
            bmi = record.bmi,
            "Health plan generated"
        );
        Ok(plan)
    }
}
