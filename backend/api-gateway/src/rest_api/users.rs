use std::future::Future;

use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::clients::proto::event::UserEventsRequest;
use crate::clients::proto::user::{
    GetUserByIdRequest, IsSubscribedRequest, ListUsersRequest, SubscribeRequest,
    UnsubscribeRequest, UpdateProfileRequest, UserProfile,
};
use crate::clients::ServiceClients;
use crate::error::Result;
use crate::middleware::AuthenticatedUser;
use crate::models::{PageQuery, SubscriptionStatus, UpdateProfileBody};
use crate::rest_api::images::{discard_image, read_upload, store_image};
use crate::rest_api::ApiSettings;

/// Email stays private to the profile owner
fn visible_to(mut profile: UserProfile, viewer: Option<AuthenticatedUser>) -> UserProfile {
    let is_owner = viewer.is_some_and(|v| v.0.to_string() == profile.id);
    if !is_owner {
        profile.email.clear();
    }
    profile
}

#[get("/users/{id}")]
pub async fn get_user(
    clients: web::Data<ServiceClients>,
    viewer: Option<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let resp = clients
        .user_client()
        .get_user_by_id(GetUserByIdRequest {
            user_id: path.into_inner(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp.user.map(|profile| visible_to(profile, viewer))))
}

async fn apply_profile_update(
    clients: &ServiceClients,
    user: AuthenticatedUser,
    body: UpdateProfileBody,
) -> Result<HttpResponse> {
    let resp = clients
        .user_client()
        .update_profile(UpdateProfileRequest {
            user_id: user.0.to_string(),
            username: body.username,
            email: body.email,
            avatar_url: body.avatar_url,
            about: body.about,
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp.user))
}

#[put("/profile")]
pub async fn update_profile(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    body: web::Json<UpdateProfileBody>,
) -> Result<HttpResponse> {
    apply_profile_update(&clients, user, body.into_inner()).await
}

/// Store the uploaded image and point the caller's avatar at it
#[post("/profile/avatar")]
pub async fn upload_avatar(
    clients: web::Data<ServiceClients>,
    settings: web::Data<ApiSettings>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let upload = read_upload(payload, settings.max_upload_bytes).await?;
    let stored = store_image(&clients, upload).await?;
    let body = UpdateProfileBody {
        avatar_url: Some(stored.url),
        ..Default::default()
    };
    let updated = apply_profile_update(&clients, user, body).await;
    cleanup_on_error(updated, || discard_image(&clients, &stored.name)).await
}

/// Runs `cleanup` if `result` failed and passes the result through unchanged
async fn cleanup_on_error<T, F>(result: Result<T>, cleanup: impl FnOnce() -> F) -> Result<T>
where
    F: Future<Output = ()>,
{
    if result.is_err() {
        cleanup().await;
    }
    result
}

#[get("/users/{id}/subscription")]
pub async fn subscription_status(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let resp = clients
        .user_client()
        .is_subscribed(IsSubscribedRequest {
            subscriber_id: user.0.to_string(),
            followed_id: path.into_inner(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(SubscriptionStatus {
        subscribed: resp.subscribed,
    }))
}

#[post("/users/{id}/subscription")]
pub async fn subscribe(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    clients
        .user_client()
        .subscribe(SubscribeRequest {
            subscriber_id: user.0.to_string(),
            followed_id: path.into_inner(),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[delete("/users/{id}/subscription")]
pub async fn unsubscribe(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    clients
        .user_client()
        .unsubscribe(UnsubscribeRequest {
            subscriber_id: user.0.to_string(),
            followed_id: path.into_inner(),
        })
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/users/{id}/subscribers")]
pub async fn subscribers(
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .user_client()
        .get_subscribers(ListUsersRequest {
            user_id: path.into_inner(),
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[get("/users/{id}/subscriptions")]
pub async fn subscriptions(
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .user_client()
        .get_subscriptions(ListUsersRequest {
            user_id: path.into_inner(),
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[get("/users/{id}/events")]
pub async fn user_events(
    clients: web::Data<ServiceClients>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let resp = clients
        .event_client()
        .get_events_by_user(UserEventsRequest {
            user_id: path.into_inner(),
            limit: query.limit(),
            offset: query.offset(),
        })
        .await?
        .into_inner();
    Ok(HttpResponse::Ok().json(resp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::cell::Cell;
    use uuid::Uuid;

    fn profile(id: Uuid) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_is_hidden_from_other_viewers() {
        let owner = Uuid::new_v4();

        let anonymous = visible_to(profile(owner), None);
        assert!(anonymous.email.is_empty());
        assert_eq!(anonymous.username, "alice");

        let stranger = visible_to(profile(owner), Some(AuthenticatedUser(Uuid::new_v4())));
        assert!(stranger.email.is_empty());

        let own = visible_to(profile(owner), Some(AuthenticatedUser(owner)));
        assert_eq!(own.email, "alice@example.com");

        let json = serde_json::to_value(&stranger).unwrap();
        assert!(json.get("email").is_none());
    }

    #[actix_web::test]
    async fn test_cleanup_runs_only_on_failure() {
        let ran = Cell::new(false);
        let ok: Result<u8> = cleanup_on_error(Ok(1), || async { ran.set(true) }).await;
        assert_eq!(ok.unwrap(), 1);
        assert!(!ran.get());

        let failed: Result<u8> =
            cleanup_on_error(Err(AppError::Unauthorized), || async { ran.set(true) }).await;
        assert!(matches!(failed, Err(AppError::Unauthorized)));
        assert!(ran.get());
    }
}
