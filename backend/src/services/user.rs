//! User service for registration, authentication and profiles
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::PasswordService;
use crate::error::{ServiceError, ServiceResult};
use crate::repositories::{NewUser, UserRepository};
use chrono::Utc;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;
use wellness_tracker_shared::models::{User, UserProfile};
use wellness_tracker_shared::types::{RegisterRequest, UpdateProfileRequest};
use wellness_tracker_shared::validation::validate_username;

/// User service
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new user with an empty profile
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<User> {
        request.validate()?;
        validate_username(&request.username).map_err(ServiceError::Validation)?;

        if self.users.username_exists(&request.username).await? {
            return Err(ServiceError::DuplicateEntity(
                "Username already registered".to_string(),
            ));
        }
        if self.users.email_exists(&request.email).await? {
            return Err(ServiceError::DuplicateEntity(
                "Email already registered".to_string(),
            ));
        }

        let RegisterRequest {
            username,
            email,
            password,
            phone,
        } = request;

        let password_hash = PasswordService::hash_async(SecretString::new(password)).await?;

        // A concurrent registration can still win the race; the store's
        // unique constraint reports it as DuplicateEntity
        let user = self
            .users
            .create_user(NewUser {
                id: Uuid::new_v4(),
                username,
                email,
                phone,
                password_hash,
            })
            .await?;

        metrics::counter!("wellness_users_registered_total").increment(1);
        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(user)
    }

    /// Check a username and password pair
    pub async fn login(&self, username: &str, password: SecretString) -> ServiceResult<User> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) => user,
            None => {
                metrics::counter!("wellness_login_failures_total", "reason" => "unknown_user")
                    .increment(1);
                return Err(ServiceError::NotFound(format!(
                    "User '{}' not found",
                    username
                )));
            }
        };

        let valid = PasswordService::verify_async(password, user.password_hash.clone()).await?;
        if !valid {
            metrics::counter!("wellness_login_failures_total", "reason" => "bad_password")
                .increment(1);
            warn!(username = %username, "Rejected login attempt");
            return Err(ServiceError::InvalidCredential);
        }

        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    pub async fn find_user(&self, username: &str) -> ServiceResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User '{}' not found", username)))
    }

    pub async fn get_profile(&self, username: &str) -> ServiceResult<UserProfile> {
        let user = self.find_user(username).await?;
        self.users
            .get_profile(user.id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Profile not found".to_string()))
    }

    /// Overwrite the profile fields present in `update`
    pub async fn update_profile(
        &self,
        username: &str,
        update: UpdateProfileRequest,
    ) -> ServiceResult<UserProfile> {
        let mut profile = self.get_profile(username).await?;
        if update.is_empty() {
            return Ok(profile);
        }

        if let Some(nickname) = update.nickname {
            profile.nickname = Some(nickname);
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = Some(avatar);
        }
        if let Some(gender) = update.gender {
            profile.gender = Some(gender);
        }
        if let Some(birth_date) = update.birth_date {
            profile.birth_date = Some(birth_date);
        }
        profile.updated_at = Utc::now();

        let saved = self.users.save_profile(&profile).await?;
        info!(user_id = %saved.user_id, "Profile updated");

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MemoryStore;
    use chrono::NaiveDate;
    use wellness_tracker_shared::models::Gender;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()))
    }

    fn request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "correctpw".to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_bad_username_charset() {
        let err = service()
            .register(request("bob smith", "bob@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_never_stores_plaintext() {
        let user = service()
            .register(request("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_ne!(user.password_hash, "correctpw");
        assert!(user.password_hash.starts_with("$argon2"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_registration_of_same_username() {
        let service = service();
        let other = service.clone();

        let (first, second) = tokio::join!(
            service.register(request("zoe", "zoe@example.com")),
            other.register(request("zoe", "zoe2@example.com")),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(ServiceError::DuplicateEntity(_))))
                .count(),
            1
        );
        assert!(service.find_user("zoe").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_profile_only_touches_present_fields() {
        let service = service();
        service
            .register(request("carol", "carol@example.com"))
            .await
            .unwrap();

        service
            .update_profile(
                "carol",
                UpdateProfileRequest {
                    nickname: Some("Caz".to_string()),
                    gender: Some(Gender::Female),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let birth_date = NaiveDate::from_ymd_opt(1990, 4, 2).unwrap();
        let profile = service
            .update_profile(
                "carol",
                UpdateProfileRequest {
                    birth_date: Some(birth_date),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.nickname.as_deref(), Some("Caz"));
        assert_eq!(profile.gender, Some(Gender::Female));
        assert_eq!(profile.birth_date, Some(birth_date));
        assert!(profile.avatar.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() {
        let err = service()
            .update_profile("ghost", UpdateProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
