//! Event ownership, search and favorites against a real Postgres.
//!
//! Run with:
//! TEST_DATABASE_URL=postgres://... cargo test -- --ignored

use chrono::{Duration, Utc};
use error_types::ServiceError;
use event_service::models::EventFields;
use event_service::{EventService, FavoriteService};
use sqlx::PgPool;
use uuid::Uuid;

async fn setup() -> Option<PgPool> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let config = db_pool::DbConfig {
        service_name: "event-service-test".to_string(),
        database_url,
        ..db_pool::DbConfig::default()
    };
    Some(db_pool::connect(&config).await.expect("database"))
}

async fn seed_user(pool: &PgPool) -> Uuid {
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
    id
}

fn fields(title: &str) -> EventFields {
    let start = Utc::now() + Duration::days(7);
    EventFields {
        title: title.to_string(),
        description: "an evening of live music".to_string(),
        location: Some("Main hall".to_string()),
        event_start: start,
        event_end: start + Duration::hours(2),
        category_id: Some(1),
        capacity: 100,
        image_url: None,
    }
}

#[tokio::test]
#[ignore]
async fn test_only_owner_can_modify() {
    let Some(pool) = setup().await else { return };
    let service = EventService::new(pool.clone());
    let owner = seed_user(&pool).await;
    let stranger = seed_user(&pool).await;

    // GIVEN: an event owned by `owner`
    let event = service.add_event(owner, fields("Owner's gig")).await.unwrap();

    // WHEN: someone else updates or deletes it
    let update = service
        .update_event(event.id, stranger, fields("Hijacked"))
        .await
        .unwrap_err();
    let delete = service.delete_event(event.id, stranger).await.unwrap_err();

    // THEN: permission denied, event intact
    assert_eq!(update.to_status().code(), tonic::Code::PermissionDenied);
    assert_eq!(delete.to_status().code(), tonic::Code::PermissionDenied);
    assert_eq!(service.get_event(event.id).await.unwrap().title, "Owner's gig");

    // Owner can update then delete; afterwards it is gone
    let updated = service
        .update_event(event.id, owner, fields("Renamed gig"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Renamed gig");
    service.delete_event(event.id, owner).await.unwrap();
    let err = service.delete_event(event.id, owner).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "event" }));
}

#[tokio::test]
#[ignore]
async fn test_unknown_category_is_not_found() {
    let Some(pool) = setup().await else { return };
    let service = EventService::new(pool.clone());
    let owner = seed_user(&pool).await;

    let mut f = fields("Lost category");
    f.category_id = Some(999_999);
    let err = service.add_event(owner, f).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "category" }));
}

#[tokio::test]
#[ignore]
async fn test_search_treats_wildcards_literally() {
    let Some(pool) = setup().await else { return };
    let service = EventService::new(pool.clone());
    let owner = seed_user(&pool).await;
    let marker = Uuid::new_v4().simple().to_string();

    service
        .add_event(owner, fields(&format!("{} 100% jazz", marker)))
        .await
        .unwrap();
    service
        .add_event(owner, fields(&format!("{} 1000 jazz", marker)))
        .await
        .unwrap();

    let hits = service
        .search(&format!("{} 100%", marker.to_uppercase()), None, 20, 0)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].title.contains("100%"));
}

#[tokio::test]
#[ignore]
async fn test_favorites_lifecycle() {
    let Some(pool) = setup().await else { return };
    let events = EventService::new(pool.clone());
    let favorites = FavoriteService::new(pool.clone());
    let user = seed_user(&pool).await;
    let event = events.add_event(user, fields("Favorite show")).await.unwrap();

    favorites.add(user, event.id).await.unwrap();
    let err = favorites.add(user, event.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict { .. }));

    let listed = favorites.list(user, 20, 0).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, event.id);

    let err = favorites.add(user, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { resource: "event" }));

    favorites.remove(user, event.id).await.unwrap();
    let err = favorites.remove(user, event.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { .. }));
}

#[tokio::test]
#[ignore]
async fn test_event_in_progress_is_listed_as_upcoming() {
    let Some(pool) = setup().await else { return };
    let service = EventService::new(pool.clone());
    let owner = seed_user(&pool).await;

    // GIVEN: an event that started an hour ago and ends in an hour
    let start = Utc::now() - Duration::hours(1);
    let running = EventFields {
        event_start: start,
        event_end: start + Duration::hours(2),
        ..fields("Running marathon")
    };
    let event = service.add_event(owner, running).await.unwrap();

    // THEN: it is upcoming until it ends, and not yet past
    let upcoming = service.upcoming(100, 0).await.unwrap();
    let past = service.past(100, 0).await.unwrap();
    assert!(upcoming.iter().any(|e| e.id == event.id));
    assert!(!past.iter().any(|e| e.id == event.id));
}
