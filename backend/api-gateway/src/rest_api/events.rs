use actix_web::{delete, get, post, put, web, HttpResponse};
use tracing::info;
use validator::Validate;

use crate::clients::proto::event::{
    AddEventRequest, DeleteEventRequest, EventInput, FavoriteRequest, GetCategoriesRequest,
    GetEventRequest, PageRequest, SearchEventsRequest, UpdateEventRequest, UserEventsRequest,
};
use crate::clients::ServiceClients;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{EventBody, PageQuery, SearchQuery};

fn to_input(body: EventBody) -> Result<EventInput> {
    body.validate()?;
    Ok(EventInput {
        title: body.title,
        description: body.description,
        location: body.location,
        event_start: body.event_start,
        event_end: body.event_end,
        category_id: body.category_id,
        capacity: body.capacity,
        image_url: body.image_url,
    })
}

#[get("/events")]
pub async fn search_events(
    clients: web::Data<ServiceClients>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let resp = clients
        .event_client()
        .search_events(SearchEventsRequest {
            query: query.q,
            category_id: query.category,
            limit: query.limit.unwrap_or(0),
            offset: query.offset.unwrap_or(0),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[get("/events/upcoming")]
pub async fn upcoming_events(
    clients: web::Data<ServiceClients>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_upcoming_events(PageRequest {
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[get("/events/past")]
pub async fn past_events(
    clients: web::Data<ServiceClients>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_past_events(PageRequest {
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

/// Upcoming events from users the caller subscribes to
#[get("/events/feed")]
pub async fn feed(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_subscriptions_events(UserEventsRequest {
            user_id: user.0.to_string(),
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[get("/events/categories")]
pub async fn categories(clients: web::Data<ServiceClients>) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_categories(GetCategoriesRequest {})
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[post("/events")]
pub async fn create_event(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    body: web::Json<EventBody>,
) -> Result<HttpResponse> {
    let event = to_input(body.into_inner())?;
    let resp = clients
        .event_client()
        .add_event(AddEventRequest {
            owner_id: user.0.to_string(),
            event: Some(event),
        })
        .await?
        .into_inner();

    if let Some(event) = &resp.event {
        info!(event_id = %event.id, owner_id = %user.0, "Event created");
    }
    Ok(HttpResponse::Created().json(resp.event))
}

#[get("/events/{id}")]
pub async fn get_event(
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_event(GetEventRequest {
            event_id: path.into_inner(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp.event))
}

#[put("/events/{id}")]
pub async fn update_event(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<EventBody>,
) -> Result<HttpResponse> {
    let event = to_input(body.into_inner())?;
    let resp = clients
        .event_client()
        .update_event(UpdateEventRequest {
            event_id: path.into_inner(),
            requester_id: user.0.to_string(),
            event: Some(event),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp.event))
}

#[delete("/events/{id}")]
pub async fn delete_event(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let event_id = path.into_inner();
    clients
        .event_client()
        .delete_event(DeleteEventRequest {
            event_id: event_id.clone(),
            requester_id: user.0.to_string(),
        })
        .await?;
    info!(event_id = %event_id, user_id = %user.0, "Event deleted");
    Ok(HttpResponse::NoContent().finish())
}

#[post("/events/{id}/favorite")]
pub async fn add_favorite(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    clients
        .event_client()
        .add_to_favorites(FavoriteRequest {
            user_id: user.0.to_string(),
            event_id: path.into_inner(),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/events/{id}/favorite")]
pub async fn remove_favorite(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    clients
        .event_client()
        .remove_from_favorites(FavoriteRequest {
            user_id: user.0.to_string(),
            event_id: path.into_inner(),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/favorites")]
pub async fn favorites(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_favorites(UserEventsRequest {
            user_id: user.0.to_string(),
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}
