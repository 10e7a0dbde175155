use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// User account row
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Issued session, backed by a Redis key with TTL
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

/// Result of a successful session lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionInfo {
    pub user_id: Uuid,
    /// Seconds until the session key expires
    pub expires_in: i64,
}
