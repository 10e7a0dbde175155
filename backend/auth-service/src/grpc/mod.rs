/// gRPC AuthService implementation
///
/// Thin mapping between protobuf messages and [`AuthService`]; all branching
/// on error sentinels happens in the service layer.
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

use crate::models::{Session, User};
use crate::services::AuthService;
use crate::validators::RegisterInput;

pub mod auth {
    tonic::include_proto!("eventhub.auth_service.v1");
}

use auth::auth_service_server::AuthService as AuthServiceRpc;
use auth::*;

pub struct AuthServiceImpl {
    service: AuthService,
}

impl AuthServiceImpl {
    pub fn new(service: AuthService) -> Self {
        Self { service }
    }
}

pub(crate) fn parse_uuid(value: &str, field: &'static str) -> Result<Uuid, Status> {
    Uuid::parse_str(value).map_err(|_| Status::invalid_argument(format!("invalid {}", field)))
}

fn to_auth_response(user: User, session: Session) -> AuthResponse {
    AuthResponse {
        user: Some(AuthUser {
            id: user.id.to_string(),
            username: user.username,
            email: user.email,
            avatar_url: user.avatar_url,
            created_at: user.created_at.timestamp(),
        }),
        session: Some(auth::Session {
            token: session.token,
            expires_at: session.expires_at.timestamp(),
            ttl_seconds: session.ttl_secs as i64,
        }),
    }
}

#[tonic::async_trait]
impl AuthServiceRpc for AuthServiceImpl {
    async fn register(
        &self,
        request: Request<RegisterRequest>,
    ) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        let input = RegisterInput::new(&req.username, &req.email, &req.password);
        let (user, session) = self.service.register(input).await?;
        Ok(Response::new(to_auth_response(user, session)))
    }

    async fn login(&self, request: Request<LoginRequest>) -> Result<Response<AuthResponse>, Status> {
        let req = request.into_inner();
        let (user, session) = self.service.login(&req.login, &req.password).await?;
        Ok(Response::new(to_auth_response(user, session)))
    }

    async fn logout(
        &self,
        request: Request<LogoutRequest>,
    ) -> Result<Response<LogoutResponse>, Status> {
        let req = request.into_inner();
        self.service.logout(&req.token).await?;
        Ok(Response::new(LogoutResponse {}))
    }

    async fn check_session(
        &self,
        request: Request<CheckSessionRequest>,
    ) -> Result<Response<CheckSessionResponse>, Status> {
        let req = request.into_inner();
        let info = self.service.check_session(&req.token).await?;
        Ok(Response::new(CheckSessionResponse {
            user_id: info.user_id.to_string(),
            expires_in: info.expires_in,
        }))
    }

    async fn change_password(
        &self,
        request: Request<ChangePasswordRequest>,
    ) -> Result<Response<ChangePasswordResponse>, Status> {
        let req = request.into_inner();
        let user_id = parse_uuid(&req.user_id, "user_id")?;
        let keep = Some(req.current_token.as_str()).filter(|t| !t.is_empty());

        let revoked = self
            .service
            .change_password(user_id, &req.old_password, &req.new_password, keep)
            .await?;

        info!(user_id = %user_id, revoked, "ChangePassword completed");
        Ok(Response::new(ChangePasswordResponse {
            revoked_sessions: revoked as i32,
        }))
    }
}
