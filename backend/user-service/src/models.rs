use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Profile row joined with subscription counters
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub about: Option<String>,
    pub subscribers_count: i64,
    pub subscriptions_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compact user entry for subscriber lists
#[derive(Debug, Clone, FromRow)]
pub struct UserCard {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Partial profile update; `None` leaves a column unchanged.
/// An empty `avatar_url` or `about` clears the column.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileChanges {
    #[validate(length(min = 3, max = 30))]
    pub username: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(max = 2048))]
    pub avatar_url: Option<String>,
    #[validate(length(max = 500))]
    pub about: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.avatar_url.is_none()
            && self.about.is_none()
    }
}
