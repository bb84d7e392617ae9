//! Integration tests for registration, login and profiles

mod common;

use common::{registration, TestApp, PASSWORD};
use secrecy::SecretString;
use wellness_tracker_backend::error::ServiceError;
use wellness_tracker_shared::models::Gender;
use wellness_tracker_shared::types::UpdateProfileRequest;

fn password(s: &str) -> SecretString {
    SecretString::new(s.to_string())
}

#[tokio::test]
async fn test_register_creates_empty_profile() {
    let app = TestApp::new();
    let request = registration("alice");

    let user = app.system().users.register(request.clone()).await.unwrap();
    assert_eq!(user.username, request.username);
    assert_eq!(user.email, request.email);

    let profile = app.system().users.get_profile(&user.username).await.unwrap();
    assert_eq!(profile.user_id, user.id);
    assert!(profile.nickname.is_none());
    assert!(profile.gender.is_none());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::new();
    let first = registration("bob");
    app.system().users.register(first.clone()).await.unwrap();

    for _ in 0..2 {
        let mut again = registration("other");
        again.username = first.username.clone();
        let err = app.system().users.register(again).await.unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateEntity(_)));
        assert_eq!(err.status_code(), 409);
    }
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::new();
    let first = registration("carl");
    app.system().users.register(first.clone()).await.unwrap();

    let mut again = registration("dora");
    again.email = first.email.clone();
    let err = app.system().users.register(again).await.unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEntity(_)));
}

#[tokio::test]
async fn test_register_invalid_input() {
    let app = TestApp::new();

    let mut bad_email = registration("eve");
    bad_email.email = "not-an-email".to_string();
    let mut weak_password = registration("eve");
    weak_password.password = "123".to_string();

    for request in [bad_email, weak_password] {
        let err = app.system().users.register(request).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}

#[tokio::test]
async fn test_login_outcomes() {
    let app = TestApp::new();
    let username = app.register("alice").await;

    let user = app
        .system()
        .users
        .login(&username, password(PASSWORD))
        .await
        .unwrap();
    assert_eq!(user.username, username);

    let err = app
        .system()
        .users
        .login(&username, password("wrongpw"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredential));

    let err = app
        .system()
        .users
        .login("nobody_here", password(PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_profile_update_round_trip() {
    let app = TestApp::new();
    let username = app.register("fay").await;

    app.system()
        .users
        .update_profile(
            &username,
            UpdateProfileRequest {
                nickname: Some("Fay".to_string()),
                avatar: Some("avatars/fay.png".to_string()),
                gender: Some(Gender::Other),
                birth_date: None,
            },
        )
        .await
        .unwrap();

    let profile = app.system().users.get_profile(&username).await.unwrap();
    assert_eq!(profile.nickname.as_deref(), Some("Fay"));
    assert_eq!(profile.avatar.as_deref(), Some("avatars/fay.png"));
    assert_eq!(profile.gender, Some(Gender::Other));
}

#[tokio::test]
async fn test_user_serialization_hides_hash() {
    let app = TestApp::new();
    let username = app.register("gus").await;
    let user = app.system().users.find_user(&username).await.unwrap();

    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("password_hash"));
    assert!(!json.contains(&user.password_hash));
}
