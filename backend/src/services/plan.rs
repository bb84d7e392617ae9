//! Plan service for wellness plans and completion tracking
//!
//! Provides business logic for:
//! - Plan creation, single and bulk
//! - Partial updates and deletion scoped to the owning user
//! - Completion check-ins and progress calculation
//! - Completed-plan statistics per weekday

use crate::error::{ServiceError, ServiceResult};
use crate::repositories::{PlanRepository, UserRepository};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;
use wellness_tracker_shared::health_metrics::calculate_plan_progress;
use wellness_tracker_shared::models::{Plan, PlanRecord, PlanStatus, User};
use wellness_tracker_shared::types::{
    CreatePlanRequest, PlanFilter, PlanProgressResponse, UpdatePlanRequest, WeeklyCompletions,
};
use wellness_tracker_shared::validation::{validate_day_of_week, validate_plan_window};

/// Plan service
#[derive(Clone)]
pub struct PlanService {
    users: Arc<dyn UserRepository>,
    plans: Arc<dyn PlanRepository>,
}

/// Validate a request and turn it into a new active plan
fn build_plan(user_id: Uuid, request: CreatePlanRequest) -> ServiceResult<Plan> {
    request.validate()?;
    validate_plan_window(request.start_time, request.end_time)
        .map_err(ServiceError::Validation)?;

    let now = Utc::now();
    Ok(Plan {
        id: Uuid::new_v4(),
        user_id,
        plan_type: request.plan_type,
        title: request.title,
        description: request.description,
        day_of_week: request.day_of_week,
        start_time: request.start_time,
        end_time: request.end_time,
        status: PlanStatus::Active,
        created_at: now,
        updated_at: now,
    })
}

impl PlanService {
    pub fn new(users: Arc<dyn UserRepository>, plans: Arc<dyn PlanRepository>) -> Self {
        Self { users, plans }
    }

    async fn require_user(&self, username: &str) -> ServiceResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", username)))
    }

    async fn require_plan(&self, plan_id: Uuid) -> ServiceResult<Plan> {
        self.plans
            .find_plan(plan_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Plan not found".to_string()))
    }

    /// Load a plan only if `user_id` owns it
    async fn require_owned_plan(&self, user_id: Uuid, plan_id: Uuid) -> ServiceResult<Plan> {
        let plan = self.require_plan(plan_id).await?;
        if plan.user_id != user_id {
            return Err(ServiceError::NotFound("Plan not found".to_string()));
        }
        Ok(plan)
    }

    /// Create an active plan
    pub async fn create_plan(
        &self,
        username: &str,
        request: CreatePlanRequest,
    ) -> ServiceResult<Plan> {
        let user = self.require_user(username).await?;
        let plan = self.plans.create_plan(build_plan(user.id, request)?).await?;

        info!(
            user_id = %user.id,
            plan_id = %plan.id,
            plan_type = plan.plan_type.as_str(),
            "Plan created"
        );
        Ok(plan)
    }

    /// Create every valid plan in one batch
    ///
    /// Invalid entries are logged and skipped. Fails only when no entry is
    /// valid.
    pub async fn create_bulk_plans(
        &self,
        username: &str,
        requests: Vec<CreatePlanRequest>,
    ) -> ServiceResult<Vec<Plan>> {
        let user = self.require_user(username).await?;

        let mut plans = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            match build_plan(user.id, request) {
                Ok(plan) => plans.push(plan),
                Err(e) => warn!(index, error = %e, "Skipping invalid plan in bulk request"),
            }
        }

        if plans.is_empty() {
            return Err(ServiceError::Validation(
                "No valid plans in request".to_string(),
            ));
        }

        let created = self.plans.create_plans(plans).await?;
        info!(user_id = %user.id, count = created.len(), "Plans created in bulk");

        Ok(created)
    }

    /// Apply the fields present in `update` to a plan the user owns
    pub async fn update_plan(
        &self,
        username: &str,
        plan_id: Uuid,
        update: UpdatePlanRequest,
    ) -> ServiceResult<Plan> {
        let user = self.require_user(username).await?;
        let mut plan = self.require_owned_plan(user.id, plan_id).await?;
        if update.is_empty() {
            return Ok(plan);
        }
        update.validate()?;

        if let Some(plan_type) = update.plan_type {
            plan.plan_type = plan_type;
        }
        if let Some(title) = update.title {
            plan.title = title;
        }
        if let Some(description) = update.description {
            plan.description = description;
        }
        if let Some(day) = update.day_of_week {
            plan.day_of_week = Some(day);
        }
        if let Some(start_time) = update.start_time {
            plan.start_time = start_time;
        }
        if let Some(end_time) = update.end_time {
            plan.end_time = end_time;
        }
        if let Some(status) = update.status {
            plan.status = status;
        }
        validate_plan_window(plan.start_time, plan.end_time).map_err(ServiceError::Validation)?;
        plan.updated_at = Utc::now();

        let plan = self.plans.save_plan(&plan).await?;
        info!(plan_id = %plan.id, status = plan.status.as_str(), "Plan updated");

        Ok(plan)
    }

    /// Ordered by start time
    pub async fn list_plans(&self, username: &str, filter: PlanFilter) -> ServiceResult<Vec<Plan>> {
        if let Some(day) = filter.day_of_week {
            validate_day_of_week(day).map_err(ServiceError::Validation)?;
        }
        let user = self.require_user(username).await?;
        Ok(self.plans.list_plans(user.id, &filter).await?)
    }

    pub async fn delete_plan(&self, username: &str, plan_id: Uuid) -> ServiceResult<()> {
        let user = self.require_user(username).await?;
        if !self.plans.delete_plan(plan_id, user.id).await? {
            return Err(ServiceError::NotFound("Plan not found".to_string()));
        }

        info!(user_id = %user.id, plan_id = %plan_id, "Plan deleted");
        Ok(())
    }

    /// Delete all of a user's plans, or only those scheduled on one weekday
    pub async fn delete_all_plans(
        &self,
        username: &str,
        day_of_week: Option<u8>,
    ) -> ServiceResult<u64> {
        if let Some(day) = day_of_week {
            validate_day_of_week(day).map_err(ServiceError::Validation)?;
        }
        let user = self.require_user(username).await?;
        let deleted = self.plans.delete_plans(user.id, day_of_week).await?;

        info!(user_id = %user.id, deleted, ?day_of_week, "Plans deleted");
        Ok(deleted)
    }

    /// Append a completion check-in stamped now
    pub async fn record_completion(
        &self,
        plan_id: Uuid,
        notes: Option<String>,
    ) -> ServiceResult<PlanRecord> {
        let plan = self.require_plan(plan_id).await?;
        let record = self
            .plans
            .create_record(PlanRecord {
                id: Uuid::new_v4(),
                plan_id: plan.id,
                completed_at: Utc::now(),
                notes,
            })
            .await?;

        metrics::counter!("wellness_plan_completions_total").increment(1);
        info!(plan_id = %plan.id, record_id = %record.id, "Plan completion recorded");

        Ok(record)
    }

    /// Completed check-ins as a share of the plan's whole days
    pub async fn get_plan_progress(&self, plan_id: Uuid) -> ServiceResult<PlanProgressResponse> {
        let plan = self.require_plan(plan_id).await?;
        let completed = self.plans.count_records(plan.id).await?;
        let progress = calculate_plan_progress(plan.start_time, plan.end_time, completed)?;

        Ok(PlanProgressResponse::new(plan.id, progress))
    }

    /// Check-ins of one plan, oldest first
    pub async fn list_completions(&self, plan_id: Uuid) -> ServiceResult<Vec<PlanRecord>> {
        let plan = self.require_plan(plan_id).await?;
        Ok(self.plans.list_records(plan.id).await?)
    }

    /// Latest check-ins across all of the user's plans
    pub async fn recent_completions(
        &self,
        username: &str,
        limit: i64,
    ) -> ServiceResult<Vec<PlanRecord>> {
        if limit <= 0 {
            return Err(ServiceError::Validation(
                "limit must be positive".to_string(),
            ));
        }
        let user = self.require_user(username).await?;
        Ok(self.plans.recent_records(user.id, limit).await?)
    }

    /// Number of the user's plans with status `completed`
    pub async fn completed_plan_count(&self, username: &str) -> ServiceResult<usize> {
        let user = self.require_user(username).await?;
        let filter = PlanFilter {
            status: Some(PlanStatus::Completed),
            ..Default::default()
        };
        Ok(self.plans.list_plans(user.id, &filter).await?.len())
    }

    /// Completed plans per scheduled weekday, Monday first
    pub async fn weekly_completions(&self, username: &str) -> ServiceResult<WeeklyCompletions> {
        let user = self.require_user(username).await?;
        let counts = self.plans.completed_by_weekday(user.id).await?;
        Ok(WeeklyCompletions { counts })
    }

    /// The user's completed plans, most recently updated first
    pub async fn recent_completed_plans(
        &self,
        username: &str,
        limit: i64,
    ) -> ServiceResult<Vec<Plan>> {
        if limit <= 0 {
            return Err(ServiceError::Validation(
                "limit must be positive".to_string(),
            ));
        }
        let user = self.require_user(username).await?;
        Ok(self
            .plans
            .recently_updated_plans(user.id, PlanStatus::Completed, limit)
            .await?)
    }
}
