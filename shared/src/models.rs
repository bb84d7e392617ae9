//! Domain entities for the Wellness Tracker
//!
//! Every entity maps one-to-one onto a persistence table. `User` is the
//! aggregate root; profiles, health records, goals and plans belong to a user,
//! and plan records belong to a plan.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Self-described gender on a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Profile attached to every user, created empty at registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub nickname: Option<String>,
    /// Reference to an avatar stored elsewhere (URL or object key)
    pub avatar: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// An empty profile for a freshly registered user
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            nickname: None,
            avatar: None,
            gender: None,
            birth_date: None,
            updated_at: now,
        }
    }
}

// ============================================================================
// Health data
// ============================================================================

/// Blood pressure reading in mmHg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BloodPressure {
    pub systolic: i32,
    pub diastolic: i32,
}

impl fmt::Display for BloodPressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.systolic, self.diastolic)
    }
}

impl FromStr for BloodPressure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (systolic, diastolic) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("Blood pressure must look like 120/80, got {}", s))?;
        let systolic = systolic
            .trim()
            .parse()
            .map_err(|_| format!("Invalid systolic value: {}", systolic))?;
        let diastolic = diastolic
            .trim()
            .parse()
            .map_err(|_| format!("Invalid diastolic value: {}", diastolic))?;
        Ok(BloodPressure {
            systolic,
            diastolic,
        })
    }
}

impl TryFrom<String> for BloodPressure {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodPressure> for String {
    fn from(value: BloodPressure) -> Self {
        value.to_string()
    }
}

/// A single health measurement. `bmi` is derived when the record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Height in meters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    pub bmi: f64,
    pub blood_pressure: Option<BloodPressure>,
    /// Resting heart rate in beats per minute
    pub heart_rate: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

/// Weight goal. Several may be active for one user at the same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthGoal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_weight: f64,
    pub target_date: NaiveDate,
    /// Percentage, stored as given
    pub current_progress: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Plans
// ============================================================================

/// Kind of wellness plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Diet,
    Exercise,
    Sleep,
}

impl PlanType {
    pub const ALL: [PlanType; 3] = [PlanType::Diet, PlanType::Exercise, PlanType::Sleep];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Diet => "diet",
            PlanType::Exercise => "exercise",
            PlanType::Sleep => "sleep",
        }
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diet" => Ok(PlanType::Diet),
            "exercise" => Ok(PlanType::Exercise),
            "sleep" => Ok(PlanType::Sleep),
            _ => Err(format!("Unknown plan type: {}", s)),
        }
    }
}

/// Plan lifecycle status. New plans start `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::Paused => "paused",
            PlanStatus::Completed => "completed",
            PlanStatus::Abandoned => "abandoned",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(PlanStatus::Active),
            "paused" => Ok(PlanStatus::Paused),
            "completed" => Ok(PlanStatus::Completed),
            "abandoned" => Ok(PlanStatus::Abandoned),
            _ => Err(format!("Unknown plan status: {}", s)),
        }
    }
}

/// Wellness plan owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: PlanType,
    pub title: String,
    pub description: String,
    /// ISO weekday (1 = Monday, 7 = Sunday) for weekly routines
    pub day_of_week: Option<u8>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One completion check-in against a plan. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}
