//! Wellness Tracker Shared Library
//!
//! This crate contains the entities, request/response shapes, health
//! calculations and validation rules shared by the backend and any
//! request layer built on top of it.

pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use types::*;

pub use models::{
    BloodPressure, Gender, HealthGoal, HealthRecord, Plan, PlanRecord, PlanStatus, PlanType, User,
    UserProfile,
};
