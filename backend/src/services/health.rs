//! Health service for measurements and weight goals
//!
//! BMI is derived when a record is stored and never recomputed.
//! Goal progress is whatever the caller last wrote; it is not bounded.

use crate::error::{ServiceError, ServiceResult};
use crate::repositories::{HealthRepository, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use wellness_tracker_shared::health_metrics::calculate_bmi;
use wellness_tracker_shared::models::{HealthGoal, HealthRecord, User};
use wellness_tracker_shared::types::{RecordHealthRequest, SetGoalRequest};
use wellness_tracker_shared::validation::validate_finite;

/// Health service
#[derive(Clone)]
pub struct HealthService {
    users: Arc<dyn UserRepository>,
    health: Arc<dyn HealthRepository>,
}

impl HealthService {
    pub fn new(users: Arc<dyn UserRepository>, health: Arc<dyn HealthRepository>) -> Self {
        Self { users, health }
    }

    async fn require_user(&self, username: &str) -> ServiceResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", username)))
    }

    /// Store a measurement with its BMI
    pub async fn record_health_data(
        &self,
        username: &str,
        request: RecordHealthRequest,
    ) -> ServiceResult<HealthRecord> {
        let user = self.require_user(username).await?;
        let bmi = calculate_bmi(request.weight, request.height)?;

        let record = HealthRecord {
            id: Uuid::new_v4(),
            user_id: user.id,
            height: request.height,
            weight: request.weight,
            bmi,
            blood_pressure: request.blood_pressure,
            heart_rate: request.heart_rate,
            recorded_at: request.recorded_at.unwrap_or_else(Utc::now),
        };

        let record = self.health.create_record(record).await?;

        metrics::counter!("wellness_health_records_total").increment(1);
        info!(user_id = %user.id, bmi = record.bmi, "Health data recorded");

        Ok(record)
    }

    /// Create a new goal; earlier goals are kept
    pub async fn set_health_goal(
        &self,
        username: &str,
        request: SetGoalRequest,
    ) -> ServiceResult<HealthGoal> {
        let user = self.require_user(username).await?;
        validate_finite("target_weight", request.target_weight)
            .map_err(ServiceError::Validation)?;
        let current_progress = request.current_progress.unwrap_or(0.0);
        validate_finite("current_progress", current_progress).map_err(ServiceError::Validation)?;

        let now = Utc::now();
        let goal = self
            .health
            .create_goal(HealthGoal {
                id: Uuid::new_v4(),
                user_id: user.id,
                target_weight: request.target_weight,
                target_date: request.target_date,
                current_progress,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(user_id = %user.id, goal_id = %goal.id, "Health goal set");
        Ok(goal)
    }

    /// Overwrite the progress of the user's most recent goal
    pub async fn update_progress(&self, username: &str, progress: f64) -> ServiceResult<HealthGoal> {
        let user = self.require_user(username).await?;
        let goal = self
            .health
            .list_goals(user.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound("No health goal set".to_string()))?;

        self.write_progress(goal, progress).await
    }

    /// Overwrite the progress of one goal owned by the user
    pub async fn update_goal_progress(
        &self,
        username: &str,
        goal_id: Uuid,
        progress: f64,
    ) -> ServiceResult<HealthGoal> {
        let user = self.require_user(username).await?;
        let goal = self
            .health
            .find_goal(goal_id)
            .await?
            .filter(|g| g.user_id == user.id)
            .ok_or_else(|| ServiceError::NotFound("Health goal not found".to_string()))?;

        self.write_progress(goal, progress).await
    }

    async fn write_progress(&self, mut goal: HealthGoal, progress: f64) -> ServiceResult<HealthGoal> {
        validate_finite("progress", progress).map_err(ServiceError::Validation)?;

        goal.current_progress = progress;
        goal.updated_at = Utc::now();
        let goal = self.health.save_goal(&goal).await?;

        info!(goal_id = %goal.id, progress, "Goal progress updated");
        Ok(goal)
    }

    pub async fn latest_record(&self, username: &str) -> ServiceResult<Option<HealthRecord>> {
        let user = self.require_user(username).await?;
        Ok(self.health.latest_record(user.id).await?)
    }

    /// Newest first
    pub async fn list_records(&self, username: &str, limit: i64) -> ServiceResult<Vec<HealthRecord>> {
        if limit <= 0 {
            return Err(ServiceError::Validation(
                "limit must be positive".to_string(),
            ));
        }
        let user = self.require_user(username).await?;
        Ok(self.health.list_records(user.id, limit).await?)
    }

    /// Newest first
    pub async fn list_goals(&self, username: &str) -> ServiceResult<Vec<HealthGoal>> {
        let user = self.require_user(username).await?;
        Ok(self.health.list_goals(user.id).await?)
    }
}
