use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Event, EventFields};

const EVENT_COLUMNS: &str = "id, title, description, location, event_start, event_end, \
     category_id, capacity, image_url, owner_id, created_at, updated_at";

pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, owner_id: Uuid, fields: &EventFields) -> Result<Event, sqlx::Error> {
        let query = format!(
            r#"
            INSERT INTO events (id, title, description, location, event_start, event_end,
                                category_id, capacity, image_url, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW(), NOW())
            RETURNING {EVENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(Uuid::new_v4())
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.location)
            .bind(fields.event_start)
            .bind(fields.event_end)
            .bind(fields.category_id)
            .bind(fields.capacity)
            .bind(&fields.image_url)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Updates only when `owner_id` owns the event
    pub async fn update_owned(
        &self,
        event_id: Uuid,
        owner_id: Uuid,
        fields: &EventFields,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            r#"
            UPDATE events
            SET title = $3, description = $4, location = $5, event_start = $6,
                event_end = $7, category_id = $8, capacity = $9, image_url = $10,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING {EVENT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .bind(owner_id)
            .bind(&fields.title)
            .bind(&fields.description)
            .bind(&fields.location)
            .bind(fields.event_start)
            .bind(fields.event_end)
            .bind(fields.category_id)
            .bind(fields.capacity)
            .bind(&fields.image_url)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn delete_owned(&self, event_id: Uuid, owner_id: Uuid) -> Result<bool, sqlx::Error> {
        let affected = sqlx::query("DELETE FROM events WHERE id = $1 AND owner_id = $2")
            .bind(event_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(affected > 0)
    }

    pub async fn owner_of(&self, event_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT owner_id FROM events WHERE id = $1")
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// `pattern` is an already escaped ILIKE pattern
    pub async fn search(
        &self,
        pattern: &str,
        category_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE (title ILIKE $1 OR description ILIKE $1)
              AND ($2::INTEGER IS NULL OR category_id = $2)
            ORDER BY event_start ASC, id
            LIMIT $3 OFFSET $4
            "#
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(pattern)
            .bind(category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Events that have not ended yet, including ones in progress, soonest first
    pub async fn upcoming(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE event_end >= $1
            ORDER BY event_start ASC, id
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Events that already ended, most recent first
    pub async fn past(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE event_end < $1
            ORDER BY event_start DESC, id
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn by_owner(
        &self,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE owner_id = $1
            ORDER BY event_start DESC, id
            LIMIT $2 OFFSET $3
            "#
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(owner_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Upcoming events owned by users that `user_id` subscribes to
    pub async fn from_subscriptions(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {cols}
            FROM events e
            JOIN subscriptions s ON s.followed_id = e.owner_id
            WHERE s.subscriber_id = $1 AND e.event_end >= $2
            ORDER BY e.event_start ASC, e.id
            LIMIT $3 OFFSET $4
            "#,
            cols = prefixed_columns("e")
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(user_id)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }
}

pub(crate) fn prefixed_columns(alias: &str) -> String {
    EVENT_COLUMNS
        .split(", ")
        .map(|c| format!("{alias}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_columns() {
        let cols = prefixed_columns("e");
        assert!(cols.starts_with("e.id, e.title"));
        assert!(cols.ends_with("e.updated_at"));
        assert_eq!(cols.matches("e.").count(), 12);
    }
}
