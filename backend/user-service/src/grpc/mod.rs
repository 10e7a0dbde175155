use tonic::{Request, Response, Status};
use uuid::Uuid;

use crate::models::{self, ProfileChanges};
use crate::services::{ProfileService, SubscriptionService};

pub mod user {
    tonic::include_proto!("eventhub.user_service.v1");
}

use user::user_service_server::UserService as UserServiceRpc;
use user::*;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

pub struct UserServiceImpl {
    profiles: ProfileService,
    subscriptions: SubscriptionService,
}

impl UserServiceImpl {
    pub fn new(profiles: ProfileService, subscriptions: SubscriptionService) -> Self {
        Self {
            profiles,
            subscriptions,
        }
    }
}

fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Status> {
    Uuid::parse_str(value).map_err(|_| Status::invalid_argument(format!("invalid {}", field)))
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

fn to_proto_profile(p: models::UserProfile) -> UserProfile {
    UserProfile {
        id: p.id.to_string(),
        username: p.username,
        email: p.email,
        avatar_url: p.avatar_url,
        about: p.about,
        subscribers_count: p.subscribers_count,
        subscriptions_count: p.subscriptions_count,
        created_at: p.created_at.timestamp(),
        updated_at: p.updated_at.timestamp(),
    }
}

fn to_proto_card(c: models::UserCard) -> UserCard {
    UserCard {
        id: c.id.to_string(),
        username: c.username,
        avatar_url: c.avatar_url,
    }
}

fn to_list_response((users, total): (Vec<models::UserCard>, i64)) -> ListUsersResponse {
    ListUsersResponse {
        users: users.into_iter().map(to_proto_card).collect(),
        total,
    }
}

#[tonic::async_trait]
impl UserServiceRpc for UserServiceImpl {
    async fn get_user_by_id(
        &self,
        request: Request<GetUserByIdRequest>,
    ) -> Result<Response<GetUserByIdResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let profile = self.profiles.get_user(user_id).await?;
        Ok(Response::new(GetUserByIdResponse {
            user: Some(to_proto_profile(profile)),
        }))
    }

    async fn update_profile(
        &self,
        request: Request<UpdateProfileRequest>,
    ) -> Result<Response<UpdateProfileResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let changes = ProfileChanges {
            username: req.username,
            email: req.email,
            avatar_url: req.avatar_url,
            about: req.about,
        };
        let profile = self.profiles.update_profile(user_id, changes).await?;
        Ok(Response::new(UpdateProfileResponse {
            user: Some(to_proto_profile(profile)),
        }))
    }

    async fn subscribe(
        &self,
        request: Request<SubscribeRequest>,
    ) -> Result<Response<SubscribeResponse>, Status> {
        let req = request.into_inner();
        let subscriber_id = parse_uuid(&req.subscriber_id, "subscriber_id")?;
        let followed_id = parse_uuid(&req.followed_id, "followed_id")?;
        self.subscriptions.subscribe(subscriber_id, followed_id).await?;
        Ok(Response::new(SubscribeResponse {}))
    }

    async fn unsubscribe(
        &self,
        request: Request<UnsubscribeRequest>,
    ) -> Result<Response<UnsubscribeResponse>, Status> {
        let req = request.into_inner();
        let subscriber_id = parse_uuid(&req.subscriber_id, "subscriber_id")?;
        let followed_id = parse_uuid(&req.followed_id, "followed_id")?;
        self.subscriptions
            .unsubscribe(subscriber_id, followed_id)
            .await?;
        Ok(Response::new(UnsubscribeResponse {}))
    }

    async fn is_subscribed(
        &self,
        request: Request<IsSubscribedRequest>,
    ) -> Result<Response<IsSubscribedResponse>, Status> {
        let req = request.into_inner();
        let subscriber_id = parse_uuid(&req.subscriber_id, "subscriber_id")?;
        let followed_id = parse_uuid(&req.followed_id, "followed_id")?;
        let subscribed = self
            .subscriptions
            .is_subscribed(subscriber_id, followed_id)
            .await?;
        Ok(Response::new(IsSubscribedResponse { subscribed }))
    }

    async fn get_subscribers(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let (limit, offset) = page(req.limit, req.offset);
        let result = self.subscriptions.subscribers(user_id, limit, offset).await?;
        Ok(Response::new(to_list_response(result)))
    }

    async fn get_subscriptions(
        &self,
        request: Request<ListUsersRequest>,
    ) -> Result<Response<ListUsersResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let (limit, offset) = page(req.limit, req.offset);
        let result = self
            .subscriptions
            .subscriptions(user_id, limit, offset)
            .await?;
        Ok(Response::new(to_list_response(result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamps() {
        assert_eq!(page(0, 0), (20, 0));
        assert_eq!(page(-5, -3), (20, 0));
        assert_eq!(page(7, 14), (7, 14));
        assert_eq!(page(1000, 0), (100, 0));
    }

    #[test]
    fn test_parse_uuid_names_field() {
        let status = parse_uuid("", "followed_id").unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "invalid followed_id");
    }

    #[test]
    fn test_list_response_keeps_total() {
        let card = models::UserCard {
            id: Uuid::new_v4(),
            username: "carol".to_string(),
            avatar_url: None,
        };
        let resp = to_list_response((vec![card], 42));
        assert_eq!(resp.users.len(), 1);
        assert_eq!(resp.users[0].username, "carol");
        assert_eq!(resp.total, 42);
    }
}
