//! Register/login/session flow against real Postgres and Redis.
//!
//! Run with:
//! TEST_DATABASE_URL=postgres://... TEST_REDIS_URL=redis://... cargo test -- --ignored

use auth_service::validators::RegisterInput;
use auth_service::{AuthService, SessionStore};
use error_types::ServiceError;
use uuid::Uuid;

const TEST_PASSWORD: &str = "integration-pass-1";

async fn setup() -> Option<AuthService> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let redis_url = std::env::var("TEST_REDIS_URL").ok()?;

    let config = db_pool::DbConfig {
        service_name: "auth-service-test".to_string(),
        database_url,
        ..db_pool::DbConfig::default()
    };
    let pool = db_pool::connect(&config).await.expect("database");
    let redis = redis_utils::RedisPool::connect(&redis_url)
        .await
        .expect("redis");

    Some(AuthService::new(pool, SessionStore::new(redis.manager(), 60)))
}

fn unique_username() -> String {
    format!("u{}", &Uuid::new_v4().simple().to_string()[..12])
}

#[tokio::test]
#[ignore]
async fn test_register_then_duplicate_username_conflicts() {
    let Some(service) = setup().await else { return };

    // GIVEN: a registered user
    let username = unique_username();
    let email = format!("{}@example.com", username);
    let (user, session) = service
        .register(RegisterInput::new(&username, &email, TEST_PASSWORD))
        .await
        .unwrap();
    assert_eq!(user.username, username);
    assert_eq!(session.user_id, user.id);

    // WHEN: registering the same username with another email
    let err = service
        .register(RegisterInput::new(
            &username,
            &format!("other-{}", email),
            TEST_PASSWORD,
        ))
        .await
        .unwrap_err();

    // THEN: conflict
    assert!(matches!(err, ServiceError::Conflict { ref message } if message == "username already taken"));
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password_and_unknown_user_look_the_same() {
    let Some(service) = setup().await else { return };

    let username = unique_username();
    let email = format!("{}@example.com", username);
    service
        .register(RegisterInput::new(&username, &email, TEST_PASSWORD))
        .await
        .unwrap();

    let wrong = service.login(&username, "wrong-password").await.unwrap_err();
    let unknown = service
        .login(&unique_username(), TEST_PASSWORD)
        .await
        .unwrap_err();

    assert_eq!(wrong.to_status().code(), tonic::Code::Unauthenticated);
    assert_eq!(wrong.to_string(), unknown.to_string());

    // Login by email works too
    let (user, _) = service.login(&email, TEST_PASSWORD).await.unwrap();
    assert_eq!(user.username, username);
}

#[tokio::test]
#[ignore]
async fn test_logout_invalidates_session() {
    let Some(service) = setup().await else { return };

    let username = unique_username();
    let (_, session) = service
        .register(RegisterInput::new(
            &username,
            &format!("{}@example.com", username),
            TEST_PASSWORD,
        ))
        .await
        .unwrap();

    // GIVEN: a live session
    let info = service.check_session(&session.token).await.unwrap();
    assert!(info.expires_in > 0 && info.expires_in <= 60);

    // WHEN: logging out twice
    service.logout(&session.token).await.unwrap();
    service.logout(&session.token).await.unwrap();

    // THEN: the session is gone
    let err = service.check_session(&session.token).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unauthenticated { .. }));
}

#[tokio::test]
#[ignore]
async fn test_change_password_revokes_other_sessions() {
    let Some(service) = setup().await else { return };

    let username = unique_username();
    let (user, first) = service
        .register(RegisterInput::new(
            &username,
            &format!("{}@example.com", username),
            TEST_PASSWORD,
        ))
        .await
        .unwrap();
    let (_, second) = service.login(&username, TEST_PASSWORD).await.unwrap();

    let revoked = service
        .change_password(user.id, TEST_PASSWORD, "brand-new-pass", Some(&first.token))
        .await
        .unwrap();

    assert_eq!(revoked, 1);
    assert!(service.check_session(&first.token).await.is_ok());
    assert!(service.check_session(&second.token).await.is_err());
    assert!(service.login(&username, TEST_PASSWORD).await.is_err());
    assert!(service.login(&username, "brand-new-pass").await.is_ok());
}
