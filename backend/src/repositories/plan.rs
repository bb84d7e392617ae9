//! Plan and plan record repository for database operations

use super::{PlanRepository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wellness_tracker_shared::models::{Plan, PlanRecord, PlanStatus, PlanType};
use wellness_tracker_shared::types::PlanFilter;

/// Plan row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub title: String,
    pub description: String,
    pub day_of_week: Option<i16>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PlanRow> for Plan {
    type Error = StoreError;

    fn try_from(row: PlanRow) -> Result<Self, Self::Error> {
        let plan_type: PlanType = row.plan_type.parse().map_err(StoreError::Corrupt)?;
        let status: PlanStatus = row.status.parse().map_err(StoreError::Corrupt)?;
        let day_of_week = row
            .day_of_week
            .map(u8::try_from)
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("day_of_week: {}", e)))?;

        Ok(Plan {
            id: row.id,
            user_id: row.user_id,
            plan_type,
            title: row.title,
            description: row.description,
            day_of_week,
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Plan record row from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlanRecordRow {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

impl From<PlanRecordRow> for PlanRecord {
    fn from(row: PlanRecordRow) -> Self {
        PlanRecord {
            id: row.id,
            plan_id: row.plan_id,
            completed_at: row.completed_at,
            notes: row.notes,
        }
    }
}

const PLAN_COLUMNS: &str = "id, user_id, plan_type, title, description, day_of_week, \
     start_time, end_time, status, created_at, updated_at";

const INSERT_PLAN: &str = r#"
    INSERT INTO plans
        (id, user_id, plan_type, title, description, day_of_week,
         start_time, end_time, status, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
    RETURNING id, user_id, plan_type, title, description, day_of_week,
              start_time, end_time, status, created_at, updated_at
"#;

/// Bind every column of a plan onto the insert statement
fn bind_plan<'q>(
    query: sqlx::query::QueryAs<'q, sqlx::Postgres, PlanRow, sqlx::postgres::PgArguments>,
    plan: &'q Plan,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, PlanRow, sqlx::postgres::PgArguments> {
    query
        .bind(plan.id)
        .bind(plan.user_id)
        .bind(plan.plan_type.as_str())
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.day_of_week.map(i16::from))
        .bind(plan.start_time)
        .bind(plan.end_time)
        .bind(plan.status.as_str())
        .bind(plan.created_at)
        .bind(plan.updated_at)
}

/// PostgreSQL implementation of [`PlanRepository`]
#[derive(Clone)]
pub struct PgPlanRepository {
    pool: PgPool,
}

impl PgPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PgPlanRepository {
    async fn create_plan(&self, plan: Plan) -> StoreResult<Plan> {
        let row = bind_plan(sqlx::query_as::<_, PlanRow>(INSERT_PLAN), &plan)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn create_plans(&self, plans: Vec<Plan>) -> StoreResult<Vec<Plan>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(plans.len());

        for plan in &plans {
            let row = bind_plan(sqlx::query_as::<_, PlanRow>(INSERT_PLAN), plan)
                .fetch_one(&mut *tx)
                .await?;
            created.push(Plan::try_from(row)?);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn find_plan(&self, plan_id: Uuid) -> StoreResult<Option<Plan>> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM plans
            WHERE id = $1
            "#
        ))
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Plan::try_from).transpose()
    }

    async fn list_plans(&self, user_id: Uuid, filter: &PlanFilter) -> StoreResult<Vec<Plan>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM plans
            WHERE user_id = $1
              AND ($2::TEXT IS NULL OR plan_type = $2)
              AND ($3::TEXT IS NULL OR status = $3)
              AND ($4::SMALLINT IS NULL OR day_of_week = $4)
            ORDER BY start_time ASC
            "#
        ))
        .bind(user_id)
        .bind(filter.plan_type.map(|t| t.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.day_of_week.map(i16::from))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn save_plan(&self, plan: &Plan) -> StoreResult<Plan> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            UPDATE plans SET
                plan_type = $2,
                title = $3,
                description = $4,
                day_of_week = $5,
                start_time = $6,
                end_time = $7,
                status = $8,
                updated_at = $9
            WHERE id = $1
            RETURNING {PLAN_COLUMNS}
            "#
        ))
        .bind(plan.id)
        .bind(plan.plan_type.as_str())
        .bind(&plan.title)
        .bind(&plan.description)
        .bind(plan.day_of_week.map(i16::from))
        .bind(plan.start_time)
        .bind(plan.end_time)
        .bind(plan.status.as_str())
        .bind(plan.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete_plan(&self, plan_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        // plan_records cascade
        let result = sqlx::query(
            r#"
            DELETE FROM plans
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(plan_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_plans(&self, user_id: Uuid, day_of_week: Option<u8>) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM plans
            WHERE user_id = $1
              AND ($2::SMALLINT IS NULL OR day_of_week = $2)
            "#,
        )
        .bind(user_id)
        .bind(day_of_week.map(i16::from))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn create_record(&self, record: PlanRecord) -> StoreResult<PlanRecord> {
        let row = sqlx::query_as::<_, PlanRecordRow>(
            r#"
            INSERT INTO plan_records (id, plan_id, completed_at, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, plan_id, completed_at, notes
            "#,
        )
        .bind(record.id)
        .bind(record.plan_id)
        .bind(record.completed_at)
        .bind(&record.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn count_records(&self, plan_id: Uuid) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM plan_records WHERE plan_id = $1
            "#,
        )
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_records(&self, plan_id: Uuid) -> StoreResult<Vec<PlanRecord>> {
        let rows = sqlx::query_as::<_, PlanRecordRow>(
            r#"
            SELECT id, plan_id, completed_at, notes
            FROM plan_records
            WHERE plan_id = $1
            ORDER BY completed_at ASC
            "#,
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PlanRecord::from).collect())
    }

    async fn recent_records(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PlanRecord>> {
        let rows = sqlx::query_as::<_, PlanRecordRow>(
            r#"
            SELECT r.id, r.plan_id, r.completed_at, r.notes
            FROM plan_records r
            JOIN plans p ON p.id = r.plan_id
            WHERE p.user_id = $1
            ORDER BY r.completed_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PlanRecord::from).collect())
    }

    async fn recently_updated_plans(
        &self,
        user_id: Uuid,
        status: PlanStatus,
        limit: i64,
    ) -> StoreResult<Vec<Plan>> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            r#"
            SELECT {PLAN_COLUMNS}
            FROM plans
            WHERE user_id = $1 AND status = $2
            ORDER BY updated_at DESC
            LIMIT $3
            "#
        ))
        .bind(user_id)
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn completed_by_weekday(&self, user_id: Uuid) -> StoreResult<[u64; 7]> {
        let rows = sqlx::query_as::<_, (i16, i64)>(
            r#"
            SELECT day_of_week, COUNT(*)
            FROM plans
            WHERE user_id = $1
              AND status = 'completed'
              AND day_of_week IS NOT NULL
            GROUP BY day_of_week
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        weekday_counts(rows)
    }
}

/// Spread `(day_of_week, count)` rows over a Monday-first array
fn weekday_counts(rows: Vec<(i16, i64)>) -> StoreResult<[u64; 7]> {
    let mut counts = [0u64; 7];
    for (day, count) in rows {
        let slot = usize::try_from(day)
            .ok()
            .filter(|d| (1..=7).contains(d))
            .ok_or_else(|| StoreError::Corrupt(format!("day_of_week: {}", day)))?;
        counts[slot - 1] = u64::try_from(count)
            .map_err(|e| StoreError::Corrupt(format!("plan count: {}", e)))?;
    }
    Ok(counts)
}
