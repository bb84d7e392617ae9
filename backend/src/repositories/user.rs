//! User repository for database operations

use super::{map_unique, NewUser, StoreError, StoreResult, UserRepository};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use wellness_tracker_shared::models::{Gender, User, UserProfile};

/// User record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Profile record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = StoreError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let gender = row
            .gender
            .as_deref()
            .map(str::parse::<Gender>)
            .transpose()
            .map_err(StoreError::Corrupt)?;

        Ok(UserProfile {
            user_id: row.user_id,
            nickname: row.nickname,
            avatar: row.avatar,
            gender,
            birth_date: row.birth_date,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL implementation of [`UserRepository`]
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        // Insert user
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, phone, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_unique)?;

        // Create empty profile
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            "#,
        )
        .bind(row.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, phone, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn username_exists(&self, username: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)
            "#,
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &str) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn get_profile(&self, user_id: Uuid) -> StoreResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, nickname, avatar, gender, birth_date, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserProfile::try_from).transpose()
    }

    async fn save_profile(&self, profile: &UserProfile) -> StoreResult<UserProfile> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE user_profiles SET
                nickname = $2,
                avatar = $3,
                gender = $4,
                birth_date = $5,
                updated_at = $6
            WHERE user_id = $1
            RETURNING user_id, nickname, avatar, gender, birth_date, updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.nickname)
        .bind(&profile.avatar)
        .bind(profile.gender.map(|g| g.as_str()))
        .bind(profile.birth_date)
        .bind(profile.updated_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_row_rejects_unknown_gender() {
        let row = ProfileRow {
            user_id: Uuid::new_v4(),
            nickname: None,
            avatar: None,
            gender: Some("robot".to_string()),
            birth_date: None,
            updated_at: Utc::now(),
        };
        assert!(matches!(
            UserProfile::try_from(row),
            Err(StoreError::Corrupt(_))
        ));
    }

    #[test]
    fn test_profile_row_maps_gender() {
        let row = ProfileRow {
            user_id: Uuid::new_v4(),
            nickname: Some("Al".to_string()),
            avatar: None,
            gender: Some("female".to_string()),
            birth_date: None,
            updated_at: Utc::now(),
        };
        let profile = UserProfile::try_from(row).unwrap();
        assert_eq!(profile.gender, Some(Gender::Female));
        assert_eq!(profile.nickname.as_deref(), Some("Al"));
    }
}
