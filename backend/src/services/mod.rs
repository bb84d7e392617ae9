//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories. Each holds shared repository handles and is cheap to clone.

pub mod export;
pub mod health;
pub mod plan;
pub mod policy;
pub mod system;
pub mod user;

pub use export::ExportService;
pub use health::HealthService;
pub use plan::PlanService;
pub use policy::{BmiPlanPolicy, PlanPolicy};
pub use system::HealthSystem;
pub use user::UserService;
