use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ProfileChanges, UserProfile};

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT
                u.id, u.username, u.email, u.avatar_url, u.about, u.created_at, u.updated_at,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.followed_id = u.id) AS subscribers_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS subscriptions_count
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Returns false if the user does not exist
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: &ProfileChanges,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                avatar_url = CASE WHEN $4::TEXT IS NULL THEN avatar_url ELSE NULLIF($4, '') END,
                about = CASE WHEN $5::TEXT IS NULL THEN about ELSE NULLIF($5, '') END,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.avatar_url.as_deref())
        .bind(changes.about.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
