use chrono::{DateTime, Utc};
use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::models::{self, EventFields};
use crate::services::{EventService, FavoriteService};

pub mod event {
    tonic::include_proto!("eventhub.event_service.v1");
}

use event::event_service_server::EventService as EventServiceRpc;
use event::*;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

pub struct EventServiceImpl {
    events: EventService,
    favorites: FavoriteService,
}

impl EventServiceImpl {
    pub fn new(events: EventService, favorites: FavoriteService) -> Self {
        Self { events, favorites }
    }
}

fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Status> {
    Uuid::parse_str(value).map_err(|_| Status::invalid_argument(format!("invalid {}", field)))
}

fn parse_timestamp(secs: i64, field: &'static str) -> Result<DateTime<Utc>, Status> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Status::invalid_argument(format!("invalid {}", field)))
}

/// Clamp page size into 1..=100; zero or negative means the default
pub fn page(limit: i32, offset: i32) -> (i64, i64) {
    let limit = if limit <= 0 {
        DEFAULT_PAGE_SIZE
    } else {
        (limit as i64).min(MAX_PAGE_SIZE)
    };
    (limit, offset.max(0) as i64)
}

fn to_fields(input: Option<EventInput>) -> Result<EventFields, Status> {
    let input = input.ok_or_else(|| Status::invalid_argument("event is required"))?;
    Ok(EventFields {
        title: input.title,
        description: input.description,
        location: input.location,
        event_start: parse_timestamp(input.event_start, "event_start")?,
        event_end: parse_timestamp(input.event_end, "event_end")?,
        category_id: input.category_id,
        capacity: input.capacity,
        image_url: input.image_url,
    })
}

fn to_proto_event(e: models::Event) -> Event {
    Event {
        id: e.id.to_string(),
        title: e.title,
        description: e.description,
        location: e.location,
        event_start: e.event_start.timestamp(),
        event_end: e.event_end.timestamp(),
        category_id: e.category_id,
        capacity: e.capacity,
        image_url: e.image_url,
        owner_id: e.owner_id.to_string(),
        created_at: e.created_at.timestamp(),
        updated_at: e.updated_at.timestamp(),
    }
}

fn to_event_list(events: Vec<models::Event>) -> EventList {
    EventList {
        events: events.into_iter().map(to_proto_event).collect(),
    }
}

fn event_response(e: models::Event) -> Response<EventResponse> {
    Response::new(EventResponse {
        event: Some(to_proto_event(e)),
    })
}

#[tonic::async_trait]
impl EventServiceRpc for EventServiceImpl {
    async fn add_event(
        &self,
        request: Request<AddEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let req = request.into_inner();
        let owner_id = parse_uuid(&req.owner_id, "owner_id")?;
        let fields = to_fields(req.event)?;
        let created = self.events.add_event(owner_id, fields).await?;
        Ok(event_response(created))
    }

    async fn update_event(
        &self,
        request: Request<UpdateEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let req = request.into_inner();
        let event_id = parse_uuid(&req.event_id, "event_id")?;
        let requester_id = parse_uuid(&req.requester_id, "requester_id")?;
        let fields = to_fields(req.event)?;
        let updated = self
            .events
            .update_event(event_id, requester_id, fields)
            .await?;
        Ok(event_response(updated))
    }

    async fn delete_event(
        &self,
        request: Request<DeleteEventRequest>,
    ) -> Result<Response<DeleteEventResponse>, Status> {
        let req = request.into_inner();
        let event_id = parse_uuid(&req.event_id, "event_id")?;
        let requester_id = parse_uuid(&req.requester_id, "requester_id")?;
        self.events.delete_event(event_id, requester_id).await?;
        Ok(Response::new(DeleteEventResponse {}))
    }

    async fn get_event(
        &self,
        request: Request<GetEventRequest>,
    ) -> Result<Response<EventResponse>, Status> {
        let req = request.into_inner();
        let event_id = parse_uuid(&req.event_id, "event_id")?;
        let found = self.events.get_event(event_id).await?;
        Ok(event_response(found))
    }

    async fn search_events(
        &self,
        request: Request<SearchEventsRequest>,
    ) -> Result<Response<EventList>, Status> {
        let req = request.into_inner();
        let (limit, offset) = page(req.limit, req.offset);
        let events = self
            .events
            .search(&req.query, req.category_id, limit, offset)
            .await?;
        Ok(Response::new(to_event_list(events)))
    }

    async fn get_upcoming_events(
        &self,
        request: Request<PageRequest>,
    ) -> Result<Response<EventList>, Status> {
        let req = request.into_inner();
        let (limit, offset) = page(req.limit, req.offset);
        let events = self.events.upcoming(limit, offset).await?;
        Ok(Response::new(to_event_list(events)))
    }

    async fn get_past_events(
        &self,
        request: Request<PageRequest>,
    ) -> Result<Response<EventList>, Status> {
        let req = request.into_inner();
        let (limit, offset) = page(req.limit, req.offset);
        let events = self.events.past(limit, offset).await?;
        Ok(Response::new(to_event_list(events)))
    }

    async fn get_events_by_user(
        &self,
        request: Request<UserEventsRequest>,
    ) -> Result<Response<EventList>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let (limit, offset) = page(req.limit, req.offset);
        let events = self.events.by_user(user_id, limit, offset).await?;
        Ok(Response::new(to_event_list(events)))
    }

    async fn get_subscriptions_events(
        &self,
        request: Request<UserEventsRequest>,
    ) -> Result<Response<EventList>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let (limit, offset) = page(req.limit, req.offset);
        let events = self.events.from_subscriptions(user_id, limit, offset).await?;
        Ok(Response::new(to_event_list(events)))
    }

    async fn get_categories(
        &self,
        _request: Request<GetCategoriesRequest>,
    ) -> Result<Response<GetCategoriesResponse>, Status> {
        let categories = self
            .events
            .categories()
            .await?
            .into_iter()
            .map(|c| Category {
                id: c.id,
                name: c.name,
            })
            .collect();
        Ok(Response::new(GetCategoriesResponse { categories }))
    }

    async fn add_to_favorites(
        &self,
        request: Request<FavoriteRequest>,
    ) -> Result<Response<FavoriteResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let event_id = parse_uuid(&req.event_id, "event_id")?;
        self.favorites.add(user_id, event_id).await?;
        Ok(Response::new(FavoriteResponse {}))
    }

    async fn remove_from_favorites(
        &self,
        request: Request<FavoriteRequest>,
    ) -> Result<Response<FavoriteResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let event_id = parse_uuid(&req.event_id, "event_id")?;
        self.favorites.remove(user_id, event_id).await?;
        Ok(Response::new(FavoriteResponse {}))
    }

    async fn get_favorites(
        &self,
        request: Request<UserEventsRequest>,
    ) -> Result<Response<EventList>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let (limit, offset) = page(req.limit, req.offset);
        let events = self.favorites.list(user_id, limit, offset).await?;
        Ok(Response::new(to_event_list(events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EventInput {
        EventInput {
            title: "Jazz night".to_string(),
            description: String::new(),
            location: None,
            event_start: 1_900_000_000,
            event_end: 1_900_003_600,
            category_id: Some(1),
            capacity: 0,
            image_url: None,
        }
    }

    #[test]
    fn test_to_fields_requires_event() {
        let status = to_fields(None).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn test_to_fields_converts_timestamps() {
        let fields = to_fields(Some(input())).unwrap();
        assert_eq!(fields.event_start.timestamp(), 1_900_000_000);
        assert_eq!((fields.event_end - fields.event_start).num_seconds(), 3600);
    }

    #[test]
    fn test_to_fields_rejects_out_of_range_timestamp() {
        let mut bad = input();
        bad.event_start = i64::MAX;
        let status = to_fields(Some(bad)).unwrap_err();
        assert_eq!(status.message(), "invalid event_start");
    }

    #[test]
    fn test_page_clamps() {
        assert_eq!(page(0, -1), (20, 0));
        assert_eq!(page(500, 40), (100, 40));
    }
}
