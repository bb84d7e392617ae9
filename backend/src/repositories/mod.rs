//! Persistence layer
//!
//! Each aggregate has a repository trait with a PostgreSQL implementation and
//! an in-memory implementation. Services only ever see the traits, so the
//! store is chosen once at startup and injected.
//!
//! The contract is deliberately plain CRUD: create, get, filter, save.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;
use wellness_tracker_shared::models::{
    HealthGoal, HealthRecord, Plan, PlanRecord, PlanStatus, User, UserProfile,
};
use wellness_tracker_shared::types::PlanFilter;

pub mod health;
pub mod memory;
pub mod plan;
pub mod user;

pub use health::PgHealthRepository;
pub use memory::MemoryStore;
pub use plan::PgPlanRepository;
pub use user::PgUserRepository;

/// Errors raised by a store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the offending field
    #[error("unique constraint violated on {0}")]
    UniqueViolation(String),

    /// A stored row could not be mapped back to an entity
    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
}

/// Users and their one-to-one profiles
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user together with its empty profile
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    async fn username_exists(&self, username: &str) -> StoreResult<bool>;

    async fn email_exists(&self, email: &str) -> StoreResult<bool>;

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>>;

    /// Overwrite the stored profile with `profile`
    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile>;
}

/// Health records and goals
#[async_trait]
pub trait HealthRepository: Send + Sync {
    async fn create_record(&self, record: HealthRecord) -> StoreResult<HealthRecord>;

    async fn latest_record(&self, user_id: Uuid) -> StoreResult<Option<HealthRecord>>;

    /// Newest first, at most `limit`
    async fn list_records(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<HealthRecord>>;

    async fn create_goal(&self, goal: HealthGoal) -> StoreResult<HealthGoal>;

    async fn find_goal(&self, goal_id: Uuid) -> StoreResult<Option<HealthGoal>>;

    /// Newest first
    async fn list_goals(&self, user_id: Uuid) -> StoreResult<Vec<HealthGoal>>;

    async fn save_goal(&self, goal: &HealthGoal) -> StoreResult<HealthGoal>;
}

/// Plans and their completion records
#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn create_plan(&self, plan: Plan) -> StoreResult<Plan>;

    /// Insert several plans atomically
    async fn create_plans(&self, plans: Vec<Plan>) -> StoreResult<Vec<Plan>>;

    async fn find_plan(&self, plan_id: Uuid) -> StoreResult<Option<Plan>>;

    /// Ordered by start time
    async fn list_plans(&self, user_id: Uuid, filter: &PlanFilter) -> StoreResult<Vec<Plan>>;

    async fn save_plan(&self, plan: &Plan) -> StoreResult<Plan>;

    /// Delete one plan and its records. Returns false if nothing matched.
    async fn delete_plan(&self, plan_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Delete all of a user's plans, optionally only those on one weekday
    async fn delete_plans(&self, user_id: Uuid, day_of_week: Option<u8>) -> StoreResult<u64>;

    async fn create_record(&self, record: PlanRecord) -> StoreResult<PlanRecord>;

    async fn count_records(&self, plan_id: Uuid) -> StoreResult<i64>;

    /// Oldest first
    async fn list_records(&self, plan_id: Uuid) -> StoreResult<Vec<PlanRecord>>;

    /// Newest first across every plan the user owns, at most `limit`
    async fn recent_records(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PlanRecord>>;

    /// Plans in `status`, most recently updated first, at most `limit`
    async fn recently_updated_plans(
        &self,
        user_id: Uuid,
        status: PlanStatus,
        limit: i64,
    ) -> StoreResult<Vec<Plan>>;

    /// Completed plans per scheduled weekday, Monday first.
    /// Plans without a weekday are not counted.
    async fn completed_by_weekday(&self, user_id: Uuid) -> StoreResult<[u64; 7]>;
}

/// Map a sqlx error, turning unique violations into `StoreError::UniqueViolation`
pub(crate) fn map_unique(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("username") => "username",
                _ => "record",
            };
            return StoreError::UniqueViolation(field.to_string());
        }
    }
    StoreError::Database(err)
}
