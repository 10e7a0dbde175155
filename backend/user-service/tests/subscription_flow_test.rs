//! Profile and subscription flows against a real Postgres.
//!
//! Run with:
//! TEST_DATABASE_URL=postgres://... cargo test -- --ignored

use error_types::ServiceError;
use sqlx::PgPool;
use user_service::models::ProfileChanges;
use user_service::{ProfileService, SubscriptionService};
use uuid::Uuid;

async fn setup() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let config = db_pool::DbConfig {
        service_name: "user-service-test".to_string(),
        database_url,
        ..db_pool::DbConfig::default()
    };
    Some(db_pool::connect(&config).await.expect("database"))
}

async fn seed_user(pool: &PgPool) -> (Uuid, String) {
    let id = Uuid::new_v4();
    let username = format!("u{}", &id.simple().to_string()[..12]);
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, 'x')",
    )
    .bind(id)
    .bind(&username)
    .bind(format!("{}@example.com", username))
    .execute(pool)
    .await
    .expect("seed user");
    (id, username)
}

#[tokio::test]
#[ignore]
async fn test_subscribe_lifecycle() {
    let Some(pool) = setup().await else { return };
    let subs = SubscriptionService::new(pool.clone());
    let profiles = ProfileService::new(pool.clone());

    // GIVEN: two users
    let (alice, _) = seed_user(&pool).await;
    let (bob, bob_name) = seed_user(&pool).await;

    // WHEN: alice follows bob
    subs.subscribe(alice, bob).await.unwrap();

    // THEN: a second subscribe conflicts and counts update
    let err = subs.subscribe(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict { .. }));
    assert!(subs.is_subscribed(alice, bob).await.unwrap());
    assert!(!subs.is_subscribed(bob, alice).await.unwrap());

    let profile = profiles.get_user(bob).await.unwrap();
    assert_eq!(profile.subscribers_count, 1);
    assert_eq!(profile.subscriptions_count, 0);

    let (following, total) = subs.subscriptions(alice, 20, 0).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(following[0].username, bob_name);

    // Unsubscribe once succeeds, twice is not found
    subs.unsubscribe(alice, bob).await.unwrap();
    let err = subs.unsubscribe(alice, bob).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "subscription" }));
}

#[tokio::test]
#[ignore]
async fn test_subscribe_edge_cases() {
    let Some(pool) = setup().await else { return };
    let subs = SubscriptionService::new(pool.clone());
    let (alice, _) = seed_user(&pool).await;

    let err = subs.subscribe(alice, alice).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput { .. }));

    let err = subs.subscribe(alice, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "user" }));
}

#[tokio::test]
#[ignore]
async fn test_update_profile_conflict_and_clear() {
    let Some(pool) = setup().await else { return };
    let profiles = ProfileService::new(pool.clone());
    let (alice, _) = seed_user(&pool).await;
    let (_, bob_name) = seed_user(&pool).await;

    let updated = profiles
        .update_profile(
            alice,
            ProfileChanges {
                about: Some("hello".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.about.as_deref(), Some("hello"));

    let cleared = profiles
        .update_profile(
            alice,
            ProfileChanges {
                about: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.about, None);

    let err = profiles
        .update_profile(
            alice,
            ProfileChanges {
                username: Some(bob_name),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "username already taken");

    let err = profiles.get_user(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "user" }));
}
