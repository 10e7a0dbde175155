use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub category_id: Option<i32>,
    pub capacity: i32,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

/// User-supplied event fields for create and full update
#[derive(Debug, Clone, Validate)]
pub struct EventFields {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    pub event_start: DateTime<Utc>,
    pub event_end: DateTime<Utc>,
    pub category_id: Option<i32>,
    /// 0 means unlimited
    #[validate(range(min = 0))]
    pub capacity: i32,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
}
