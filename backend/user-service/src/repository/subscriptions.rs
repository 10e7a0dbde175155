use sqlx::PgPool;
use uuid::Uuid;

use crate::models::UserCard;

pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true if a new row was inserted, false if it already existed
    pub async fn insert(&self, subscriber_id: Uuid, followed_id: Uuid) -> Result<bool, sqlx::Error> {
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO subscriptions (subscriber_id, followed_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (subscriber_id, followed_id) DO NOTHING
            RETURNING TRUE
            "#,
        )
        .bind(subscriber_id)
        .bind(followed_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    /// Returns true if a row was removed
    pub async fn delete(&self, subscriber_id: Uuid, followed_id: Uuid) -> Result<bool, sqlx::Error> {
        let affected = sqlx::query(
            r#"
            DELETE FROM subscriptions
            WHERE subscriber_id = $1 AND followed_id = $2
            "#,
        )
        .bind(subscriber_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(affected > 0)
    }

    pub async fn exists(&self, subscriber_id: Uuid, followed_id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM subscriptions
                WHERE subscriber_id = $1 AND followed_id = $2
            )
            "#,
        )
        .bind(subscriber_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Users subscribed to `user_id`, newest first
    pub async fn list_subscribers(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserCard>, sqlx::Error> {
        sqlx::query_as::<_, UserCard>(
            r#"
            SELECT u.id, u.username, u.avatar_url
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.followed_id = $1
            ORDER BY s.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    /// Users `user_id` is subscribed to, newest first
    pub async fn list_subscriptions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserCard>, sqlx::Error> {
        sqlx::query_as::<_, UserCard>(
            r#"
            SELECT u.id, u.username, u.avatar_url
            FROM subscriptions s
            JOIN users u ON u.id = s.followed_id
            WHERE s.subscriber_id = $1
            ORDER BY s.created_at DESC, u.id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_subscribers(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE followed_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_subscriptions(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }
}
