//! In-memory store
//!
//! Implements every repository trait over one shared map set, enforcing the
//! same unique constraints and cascades as the PostgreSQL schema. Used for
//! tests and for running without a database.

use super::{
    HealthRepository, NewUser, PlanRepository, StoreError, StoreResult, UserRepository,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use wellness_tracker_shared::models::{
    HealthGoal, HealthRecord, Plan, PlanRecord, PlanStatus, User, UserProfile,
};
use wellness_tracker_shared::types::PlanFilter;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, UserProfile>,
    // Vecs keep insertion order, which breaks timestamp ties
    health_records: Vec<HealthRecord>,
    health_goals: Vec<HealthGoal>,
    plans: Vec<Plan>,
    plan_records: Vec<PlanRecord>,
}

/// Shared in-memory store. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(plan: &Plan, filter: &PlanFilter) -> bool {
    filter.plan_type.map_or(true, |t| plan.plan_type == t)
        && filter.status.map_or(true, |s| plan.status == s)
        && filter.day_of_week.map_or(true, |d| plan.day_of_week == Some(d))
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::UniqueViolation("username".to_string()));
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::UniqueViolation("email".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        tables
            .profiles
            .insert(created.id, UserProfile::empty(created.id, now));

        Ok(created)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().any(|u| u.email == email))
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(&user_id).cloned())
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .profiles
            .get_mut(&profile.user_id)
            .ok_or_else(|| StoreError::Corrupt(format!("no profile row for {}", profile.user_id)))?;
        *slot = profile.clone();
        Ok(slot.clone())
    }
}

#[async_trait]
impl HealthRepository for MemoryStore {
    async fn create_record(&self, record: HealthRecord) -> StoreResult<HealthRecord> {
        let mut tables = self.tables.write().await;
        tables.health_records.push(record.clone());
        Ok(record)
    }

    async fn latest_record(&self, user_id: Uuid) -> StoreResult<Option<HealthRecord>> {
        let tables = self.tables.read().await;
        let mut latest: Option<&HealthRecord> = None;
        for record in tables.health_records.iter().filter(|r| r.user_id == user_id) {
            if latest.map_or(true, |l| record.recorded_at >= l.recorded_at) {
                latest = Some(record);
            }
        }
        Ok(latest.cloned())
    }

    async fn list_records(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<HealthRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<HealthRecord> = tables
            .health_records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn create_goal(&self, goal: HealthGoal) -> StoreResult<HealthGoal> {
        let mut tables = self.tables.write().await;
        tables.health_goals.push(goal.clone());
        Ok(goal)
    }

    async fn find_goal(&self, goal_id: Uuid) -> StoreResult<Option<HealthGoal>> {
        let tables = self.tables.read().await;
        Ok(tables
            .health_goals
            .iter()
            .find(|g| g.id == goal_id)
            .cloned())
    }

    async fn list_goals(&self, user_id: Uuid) -> StoreResult<Vec<HealthGoal>> {
        let tables = self.tables.read().await;
        let mut goals: Vec<HealthGoal> = tables
            .health_goals
            .iter()
            .rev()
            .filter(|g| g.user_id == user_id)
            .cloned()
            .collect();
        goals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(goals)
    }

    async fn save_goal(&self, goal: &HealthGoal) -> StoreResult<HealthGoal> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .health_goals
            .iter_mut()
            .find(|g| g.id == goal.id)
            .ok_or_else(|| StoreError::Corrupt(format!("no goal row for {}", goal.id)))?;
        *slot = goal.clone();
        Ok(slot.clone())
    }
}

#[async_trait]
impl PlanRepository for MemoryStore {
    async fn create_plan(&self, plan: Plan) -> StoreResult<Plan> {
        let mut tables = self.tables.write().await;
        tables.plans.push(plan.clone());
        Ok(plan)
    }

    async fn create_plans(&self, plans: Vec<Plan>) -> StoreResult<Vec<Plan>> {
        let mut tables = self.tables.write().await;
        tables.plans.extend(plans.iter().cloned());
        Ok(plans)
    }

    async fn find_plan(&self, plan_id: Uuid) -> StoreResult<Option<Plan>> {
        let tables = self.tables.read().await;
        Ok(tables.plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn list_plans(&self, user_id: Uuid, filter: &PlanFilter) -> StoreResult<Vec<Plan>> {
        let tables = self.tables.read().await;
        let mut plans: Vec<Plan> = tables
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && matches_filter(p, filter))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.start_time.cmp(&b.start_time));
        Ok(plans)
    }

    async fn save_plan(&self, plan: &Plan) -> StoreResult<Plan> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .plans
            .iter_mut()
            .find(|p| p.id == plan.id)
            .ok_or_else(|| StoreError::Corrupt(format!("no plan row for {}", plan.id)))?;
        *slot = plan.clone();
        Ok(slot.clone())
    }

    async fn delete_plan(&self, plan_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.plans.len();
        tables
            .plans
            .retain(|p| !(p.id == plan_id && p.user_id == user_id));
        let deleted = tables.plans.len() < before;
        if deleted {
            tables.plan_records.retain(|r| r.plan_id != plan_id);
        }
        Ok(deleted)
    }

    async fn delete_plans(&self, user_id: Uuid, day_of_week: Option<u8>) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let doomed: Vec<Uuid> = tables
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && day_of_week.map_or(true, |d| p.day_of_week == Some(d)))
            .map(|p| p.id)
            .collect();

        tables.plans.retain(|p| !doomed.contains(&p.id));
        tables.plan_records.retain(|r| !doomed.contains(&r.plan_id));
        Ok(doomed.len() as u64)
    }

    async fn create_record(&self, record: PlanRecord) -> StoreResult<PlanRecord> {
        let mut tables = self.tables.write().await;
        if !tables.plans.iter().any(|p| p.id == record.plan_id) {
            return Err(StoreError::Corrupt(format!(
                "plan {} does not exist",
                record.plan_id
            )));
        }
        tables.plan_records.push(record.clone());
        Ok(record)
    }

    async fn count_records(&self, plan_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .plan_records
            .iter()
            .filter(|r| r.plan_id == plan_id)
            .count() as i64)
    }

    async fn list_records(&self, plan_id: Uuid) -> StoreResult<Vec<PlanRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<PlanRecord> = tables
            .plan_records
            .iter()
            .filter(|r| r.plan_id == plan_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.completed_at.cmp(&b.completed_at));
        Ok(records)
    }

    async fn recent_records(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<PlanRecord>> {
        let tables = self.tables.read().await;
        let owned: Vec<Uuid> = tables
            .plans
            .iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| p.id)
            .collect();
        let mut records: Vec<PlanRecord> = tables
            .plan_records
            .iter()
            .rev()
            .filter(|r| owned.contains(&r.plan_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        records.truncate(limit.max(0) as usize);
        Ok(records)
    }

    async fn recently_updated_plans(
        &self,
        user_id: Uuid,
        status: PlanStatus,
        limit: i64,
    ) -> StoreResult<Vec<Plan>> {
        let tables = self.tables.read().await;
        let mut plans: Vec<Plan> = tables
            .plans
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id && p.status == status)
            .cloned()
            .collect();
        plans.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        plans.truncate(limit.max(0) as usize);
        Ok(plans)
    }

    async fn completed_by_weekday(&self, user_id: Uuid) -> StoreResult<[u64; 7]> {
        let tables = self.tables.read().await;
        let mut counts = [0u64; 7];
        for plan in tables
            .plans
            .iter()
            .filter(|p| p.user_id == user_id && p.status == PlanStatus::Completed)
        {
            if let Some(day @ 1..=7) = plan.day_of_week {
                counts[usize::from(day) - 1] += 1;
            }
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use wellness_tracker_shared::models::{PlanStatus, PlanType};

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            phone: None,
            password_hash: "hash".to_string(),
        }
    }

    fn plan(user_id: Uuid, day: Option<u8>, offset_days: i64) -> Plan {
        let now = Utc::now();
        Plan {
            id: Uuid::new_v4(),
            user_id,
            plan_type: PlanType::Sleep,
            title: "Bed by 11".to_string(),
            description: String::new(),
            day_of_week: day,
            start_time: now + Duration::days(offset_days),
            end_time: now + Duration::days(offset_days + 7),
            status: PlanStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_user_enforces_unique_username_and_email() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", "a@x.com")).await.unwrap();

        let err = store
            .create_user(new_user("alice", "other@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref f) if f == "username"));

        let err = store
            .create_user(new_user("alicia", "a@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(ref f) if f == "email"));
    }

    #[tokio::test]
    async fn test_create_user_creates_empty_profile() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("bob", "b@x.com")).await.unwrap();

        let profile = store.get_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.user_id, user.id);
        assert!(profile.nickname.is_none());
    }

    #[tokio::test]
    async fn test_list_plans_sorted_and_filtered() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_plan(plan(owner, Some(2), 5)).await.unwrap();
        store.create_plan(plan(owner, Some(1), 1)).await.unwrap();
        store.create_plan(plan(Uuid::new_v4(), Some(1), 0)).await.unwrap();

        let all = store.list_plans(owner, &PlanFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].start_time < all[1].start_time);

        let mondays = store
            .list_plans(
                owner,
                &PlanFilter {
                    day_of_week: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(mondays.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_plan_cascades_records() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let created = store.create_plan(plan(owner, None, 0)).await.unwrap();
        let record = PlanRecord {
            id: Uuid::new_v4(),
            plan_id: created.id,
            completed_at: Utc::now(),
            notes: None,
        };
        PlanRepository::create_record(&store, record).await.unwrap();

        // Wrong owner leaves it alone
        assert!(!store.delete_plan(created.id, Uuid::new_v4()).await.unwrap());
        assert!(store.delete_plan(created.id, owner).await.unwrap());
        assert_eq!(store.count_records(created.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_plans_by_weekday() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        store.create_plan(plan(owner, Some(3), 0)).await.unwrap();
        store.create_plan(plan(owner, Some(3), 1)).await.unwrap();
        store.create_plan(plan(owner, Some(4), 2)).await.unwrap();

        assert_eq!(store.delete_plans(owner, Some(3)).await.unwrap(), 2);
        assert_eq!(store.delete_plans(owner, None).await.unwrap(), 1);
        assert_eq!(store.delete_plans(owner, None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_completed_plans_by_weekday_and_recency() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let base = Utc::now();

        for (day, status, minutes) in [
            (Some(3), PlanStatus::Completed, 1),
            (Some(3), PlanStatus::Completed, 3),
            (Some(7), PlanStatus::Completed, 2),
            (None, PlanStatus::Completed, 4),
            (Some(1), PlanStatus::Active, 5),
        ] {
            let mut p = plan(owner, day, 0);
            p.status = status;
            p.updated_at = base + Duration::minutes(minutes);
            store.create_plan(p).await.unwrap();
        }

        assert_eq!(
            store.completed_by_weekday(owner).await.unwrap(),
            [0, 0, 2, 0, 0, 0, 1]
        );

        let recent = store
            .recently_updated_plans(owner, PlanStatus::Completed, 2)
            .await
            .unwrap();
        let days: Vec<Option<u8>> = recent.iter().map(|p| p.day_of_week).collect();
        assert_eq!(days, vec![None, Some(3)]);
    }
}
