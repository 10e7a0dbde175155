use chrono::Utc;
use error_types::{DatabaseError, ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Category, Event, EventFields};
use crate::repository::{CategoryRepository, EventRepository};

/// Trim then validate event fields
pub fn prepare_fields(mut fields: EventFields) -> ServiceResult<EventFields> {
    fields.title = fields.title.trim().to_string();
    fields.location = fields
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());
    fields.image_url = fields.image_url.filter(|u| !u.is_empty());

    fields.validate().map_err(|e| {
        let mut names: Vec<String> = e.field_errors().keys().map(|f| f.to_string()).collect();
        names.sort();
        ServiceError::invalid_input(format!("invalid {}", names.join(", ")))
    })?;

    if fields.event_end < fields.event_start {
        return Err(ServiceError::invalid_input(
            "event_end must not be before event_start",
        ));
    }

    Ok(fields)
}

/// Escape LIKE wildcards and wrap the query for a substring match
pub fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn write_error(err: sqlx::Error) -> ServiceError {
    match DatabaseError::from(err) {
        e if e.is_foreign_key_violation() => match e.constraint() {
            Some(c) if c.contains("category") => ServiceError::not_found("category"),
            _ => ServiceError::not_found("user"),
        },
        e => ServiceError::from(e),
    }
}

pub struct EventService {
    events: EventRepository,
    categories: CategoryRepository,
}

impl EventService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            categories: CategoryRepository::new(pool),
        }
    }

    pub async fn add_event(&self, owner_id: Uuid, fields: EventFields) -> ServiceResult<Event> {
        let fields = prepare_fields(fields)?;
        let event = self
            .events
            .create(owner_id, &fields)
            .await
            .map_err(write_error)?;

        info!(event = "event_created", event_id = %event.id, owner_id = %owner_id);
        Ok(event)
    }

    pub async fn update_event(
        &self,
        event_id: Uuid,
        requester_id: Uuid,
        fields: EventFields,
    ) -> ServiceResult<Event> {
        let fields = prepare_fields(fields)?;
        match self
            .events
            .update_owned(event_id, requester_id, &fields)
            .await
            .map_err(write_error)?
        {
            Some(event) => {
                info!(event = "event_updated", event_id = %event_id);
                Ok(event)
            }
            None => Err(self.ownership_error(event_id, "update this event").await),
        }
    }

    pub async fn delete_event(&self, event_id: Uuid, requester_id: Uuid) -> ServiceResult<()> {
        if self.events.delete_owned(event_id, requester_id).await? {
            info!(event = "event_deleted", event_id = %event_id);
            return Ok(());
        }
        Err(self.ownership_error(event_id, "delete this event").await)
    }

    /// Explains why an owner-scoped write touched no rows
    async fn ownership_error(&self, event_id: Uuid, action: &'static str) -> ServiceError {
        match self.events.owner_of(event_id).await {
            Ok(Some(_)) => ServiceError::PermissionDenied { action },
            Ok(None) => ServiceError::not_found("event"),
            Err(e) => ServiceError::from(e),
        }
    }

    pub async fn get_event(&self, event_id: Uuid) -> ServiceResult<Event> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("event"))
    }

    pub async fn search(
        &self,
        query: &str,
        category_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Event>> {
        Ok(self
            .events
            .search(&like_pattern(query), category_id, limit, offset)
            .await?)
    }

    pub async fn upcoming(&self, limit: i64, offset: i64) -> ServiceResult<Vec<Event>> {
        Ok(self.events.upcoming(Utc::now(), limit, offset).await?)
    }

    pub async fn past(&self, limit: i64, offset: i64) -> ServiceResult<Vec<Event>> {
        Ok(self.events.past(Utc::now(), limit, offset).await?)
    }

    pub async fn by_user(&self, user_id: Uuid, limit: i64, offset: i64) -> ServiceResult<Vec<Event>> {
        Ok(self.events.by_owner(user_id, limit, offset).await?)
    }

    pub async fn from_subscriptions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Event>> {
        Ok(self
            .events
            .from_subscriptions(user_id, Utc::now(), limit, offset)
            .await?)
    }

    pub async fn categories(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.categories.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn fields() -> EventFields {
        let start = Utc.with_ymd_and_hms(2030, 6, 1, 18, 0, 0).unwrap();
        EventFields {
            title: "  Rust meetup ".to_string(),
            description: "talks".to_string(),
            location: Some("  ".to_string()),
            event_start: start,
            event_end: start + Duration::hours(3),
            category_id: Some(6),
            capacity: 50,
            image_url: Some(String::new()),
        }
    }

    #[test]
    fn test_prepare_fields_trims() {
        let prepared = prepare_fields(fields()).unwrap();
        assert_eq!(prepared.title, "Rust meetup");
        assert_eq!(prepared.location, None);
        assert_eq!(prepared.image_url, None);
    }

    #[test]
    fn test_prepare_fields_rejects_blank_title() {
        let mut f = fields();
        f.title = "   ".to_string();
        assert_eq!(prepare_fields(f).unwrap_err().to_string(), "invalid title");
    }

    #[test]
    fn test_prepare_fields_rejects_end_before_start() {
        let mut f = fields();
        f.event_end = f.event_start - Duration::minutes(1);
        assert!(matches!(
            prepare_fields(f).unwrap_err(),
            ServiceError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_prepare_fields_accepts_zero_length_event() {
        let mut f = fields();
        f.event_end = f.event_start;
        assert!(prepare_fields(f).is_ok());
    }

    #[test]
    fn test_prepare_fields_rejects_negative_capacity() {
        let mut f = fields();
        f.capacity = -1;
        assert_eq!(prepare_fields(f).unwrap_err().to_string(), "invalid capacity");
    }

    #[test]
    fn test_prepare_fields_rejects_long_description() {
        let mut f = fields();
        f.description = "x".repeat(5001);
        assert!(prepare_fields(f).is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("jazz"), "%jazz%");
        assert_eq!(like_pattern(" 100% "), "%100\\%%");
        assert_eq!(like_pattern("a_b\\c"), "%a\\_b\\\\c%");
        assert_eq!(like_pattern(""), "%%");
    }
}
