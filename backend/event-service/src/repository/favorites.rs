use sqlx::PgPool;
use uuid::Uuid;

use super::events::prefixed_columns;
use crate::models::Event;

pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true if a new favorite was recorded
    pub async fn insert(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, sqlx::Error> {
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO favorite_events (user_id, event_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, event_id) DO NOTHING
            RETURNING TRUE
            "#,
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(inserted.is_some())
    }

    pub async fn delete(&self, user_id: Uuid, event_id: Uuid) -> Result<bool, sqlx::Error> {
        let affected =
            sqlx::query("DELETE FROM favorite_events WHERE user_id = $1 AND event_id = $2")
                .bind(user_id)
                .bind(event_id)
                .execute(&self.pool)
                .await?
                .rows_affected();

        Ok(affected > 0)
    }

    /// Favorites of `user_id`, most recently added first
    pub async fn list(&self, user_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {cols}
            FROM favorite_events f
            JOIN events e ON e.id = f.event_id
            WHERE f.user_id = $1
            ORDER BY f.created_at DESC, e.id
            LIMIT $2 OFFSET $3
            "#,
            cols = prefixed_columns("e")
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }
}
