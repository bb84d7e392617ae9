//! Health record and goal repository for database operations

use super::{HealthRepository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wellness_tracker_shared::models::{BloodPressure, HealthGoal, HealthRecord};

/// Health record row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HealthRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub height: f64,
    pub weight: f64,
    pub bmi: f64,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

impl TryFrom<HealthRecordRow> for HealthRecord {
    type Error = StoreError;

    fn try_from(row: HealthRecordRow) -> Result<Self, Self::Error> {
        let blood_pressure = row
            .blood_pressure
            .as_deref()
            .map(str::parse::<BloodPressure>)
            .transpose()
            .map_err(StoreError::Corrupt)?;

        Ok(HealthRecord {
            id: row.id,
            user_id: row.user_id,
            height: row.height,
            weight: row.weight,
            bmi: row.bmi,
            blood_pressure,
            heart_rate: row.heart_rate,
            recorded_at: row.recorded_at,
        })
    }
}

/// Health goal row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HealthGoalRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_weight: f64,
    pub target_date: NaiveDate,
    pub current_progress: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<HealthGoalRow> for HealthGoal {
    fn from(row: HealthGoalRow) -> Self {
        HealthGoal {
            id: row.id,
            user_id: row.user_id,
            target_weight: row.target_weight,
            target_date: row.target_date,
            current_progress: row.current_progress,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const RECORD_COLUMNS: &str =
    "id, user_id, height, weight, bmi, blood_pressure, heart_rate, recorded_at";

const GOAL_COLUMNS: &str =
    "id, user_id, target_weight, target_date, current_progress, created_at, updated_at";

/// PostgreSQL implementation of [`HealthRepository`]
#[derive(Clone)]
pub struct PgHealthRepository {
    pool: PgPool,
}

impl PgHealthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthRepository for PgHealthRepository {
    async fn create_record(&self, record: HealthRecord) -> StoreResult<HealthRecord> {
        let row = sqlx::query_as::<_, HealthRecordRow>(&format!(
            r#"
            INSERT INTO health_records
                (id, user_id, height, weight, bmi, blood_pressure, heart_rate, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(record.id)
        .bind(record.user_id)
        .bind(record.height)
        .bind(record.weight)
        .bind(record.bmi)
        .bind(record.blood_pressure.map(|bp| bp.to_string()))
        .bind(record.heart_rate)
        .bind(record.recorded_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn latest_record(&self, user_id: Uuid) -> StoreResult<Option<HealthRecord>> {
        let row = sqlx::query_as::<_, HealthRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM health_records
            WHERE user_id = $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(HealthRecord::try_from).transpose()
    }

    async fn list_records(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<HealthRecord>> {
        let rows = sqlx::query_as::<_, HealthRecordRow>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM health_records
            WHERE user_id = $1
            ORDER BY recorded_at DESC
            LIMIT $2
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HealthRecord::try_from).collect()
    }

    async fn create_goal(&self, goal: HealthGoal) -> StoreResult<HealthGoal> {
        let row = sqlx::query_as::<_, HealthGoalRow>(&format!(
            r#"
            INSERT INTO health_goals
                (id, user_id, target_weight, target_date, current_progress, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(goal.target_weight)
        .bind(goal.target_date)
        .bind(goal.current_progress)
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_goal(&self, goal_id: Uuid) -> StoreResult<Option<HealthGoal>> {
        let row = sqlx::query_as::<_, HealthGoalRow>(&format!(
            r#"
            SELECT {GOAL_COLUMNS}
            FROM health_goals
            WHERE id = $1
            "#
        ))
        .bind(goal_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(HealthGoal::from))
    }

    async fn list_goals(&self, user_id: Uuid) -> StoreResult<Vec<HealthGoal>> {
        let rows = sqlx::query_as::<_, HealthGoalRow>(&format!(
            r#"
            SELECT {GOAL_COLUMNS}
            FROM health_goals
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(HealthGoal::from).collect())
    }

    async fn save_goal(&self, goal: &HealthGoal) -> StoreResult<HealthGoal> {
        let row = sqlx::query_as::<_, HealthGoalRow>(&format!(
            r#"
            UPDATE health_goals SET
                target_weight = $2,
                target_date = $3,
                current_progress = $4,
                updated_at = $5
            WHERE id = $1
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(goal.id)
        .bind(goal.target_weight)
        .bind(goal.target_date)
        .bind(goal.current_progress)
        .bind(goal.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
