//! Request and response shapes
//!
//! These are the plain field-to-value mappings a request layer deserializes
//! into before calling a service.

use crate::health_metrics::PlanProgress;
use crate::models::{BloodPressure, Gender, PlanStatus, PlanType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Users
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 150))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Partial profile update. Only fields that are present overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl UpdateProfileRequest {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none()
            && self.avatar.is_none()
            && self.gender.is_none()
            && self.birth_date.is_none()
    }
}

// ============================================================================
// Health data
// ============================================================================

/// Health measurement request. Height in meters, weight in kilograms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHealthRequest {
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub blood_pressure: Option<BloodPressure>,
    #[serde(default)]
    pub heart_rate: Option<i32>,
    /// Defaults to the time the record is stored
    #[serde(default)]
    pub recorded_at: Option<DateTime<Utc>>,
}

/// New health goal request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetGoalRequest {
    pub target_weight: f64,
    pub target_date: NaiveDate,
    #[serde(default)]
    pub current_progress: Option<f64>,
}

// ============================================================================
// Plans
// ============================================================================

/// New plan request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePlanRequest {
    pub plan_type: PlanType,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 7))]
    pub day_of_week: Option<u8>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Partial plan update. Only fields that are present overwrite.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    #[serde(default)]
    pub plan_type: Option<PlanType>,
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, max = 7))]
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<PlanStatus>,
}

impl UpdatePlanRequest {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.plan_type.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.day_of_week.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.status.is_none()
    }
}

/// Plan list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanFilter {
    #[serde(default)]
    pub plan_type: Option<PlanType>,
    #[serde(default)]
    pub status: Option<PlanStatus>,
    #[serde(default)]
    pub day_of_week: Option<u8>,
}

/// Plan progress response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanProgressResponse {
    pub plan_id: String,
    pub total_days: i64,
    pub completed_days: i64,
    pub progress: f64,
}

impl PlanProgressResponse {
    pub fn new(plan_id: uuid::Uuid, progress: PlanProgress) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            total_days: progress.total_days,
            completed_days: progress.completed_days,
            progress: progress.progress,
        }
    }
}

/// Completed plans per scheduled weekday, Monday first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCompletions {
    pub counts: [u64; 7],
}

impl WeeklyCompletions {
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            phone: None,
        }
    }

    #[test]
    fn test_register_request_validation() {
        let email: String = SafeEmail().fake();
        assert!(register("alice", &email, "correctpw").validate().is_ok());
        assert!(register("al", &email, "correctpw").validate().is_err());
        assert!(register("alice", "not-an-email", "correctpw").validate().is_err());
        assert!(register("alice", &email, "short").validate().is_err());
    }

    #[test]
    fn test_create_plan_day_of_week_range() {
        let now = Utc::now();
        let mut req = CreatePlanRequest {
            plan_type: PlanType::Exercise,
            title: "Morning run".to_string(),
            description: String::new(),
            day_of_week: Some(3),
            start_time: now,
            end_time: now,
        };
        assert!(req.validate().is_ok());

        req.day_of_week = Some(8);
        assert!(req.validate().is_err());

        req.day_of_week = None;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_record_health_request_from_json() {
        let req: RecordHealthRequest = serde_json::from_str(
            r#"{"height": 1.75, "weight": 70, "blood_pressure": "120/80"}"#,
        )
        .unwrap();
        assert_eq!(req.height, 1.75);
        assert_eq!(req.blood_pressure.unwrap().systolic, 120);
        assert!(req.heart_rate.is_none());
        assert!(req.recorded_at.is_none());
    }

    #[test]
    fn test_update_requests_report_empty() {
        assert!(UpdateProfileRequest::default().is_empty());
        assert!(UpdatePlanRequest::default().is_empty());

        let update = UpdatePlanRequest {
            status: Some(PlanStatus::Paused),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
