use actix_web::{get, post, put, web, HttpResponse};
use tracing::info;
use validator::Validate;

use crate::clients::proto::auth::{
    AuthResponse, ChangePasswordRequest, CheckSessionRequest, LoginRequest, LogoutRequest,
    RegisterRequest,
};
use crate::clients::proto::user::GetUserByIdRequest;
use crate::clients::ServiceClients;
use crate::error::{AppError, Result};
use crate::middleware::csrf::CSRF_COOKIE;
use crate::middleware::session::{expired_session_cookie, session_cookie};
use crate::middleware::{AuthenticatedUser, SessionToken};
use crate::models::{
    ChangePasswordBody, ChangePasswordResponse, CurrentSessionResponse, LoginBody, RegisterBody,
    SessionResponse,
};
use crate::rest_api::ApiSettings;

/// Turn an auth response into a cookie-carrying HTTP response
fn session_established(
    mut builder: actix_web::HttpResponseBuilder,
    auth: AuthResponse,
    settings: &ApiSettings,
) -> Result<HttpResponse> {
    let session = auth
        .session
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("auth response without session")))?;

    Ok(builder
        .cookie(session_cookie(
            &session.token,
            session.ttl_seconds,
            settings.secure_cookies,
        ))
        .json(SessionResponse {
            user: auth.user,
            expires_at: session.expires_at,
        }))
}

#[post("/auth/register")]
pub async fn register(
    clients: web::Data<ServiceClients>,
    settings: web::Data<ApiSettings>,
    body: web::Json<RegisterBody>,
) -> Result<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let resp = clients
        .auth_client()
        .register(RegisterRequest {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?
        .into_inner();

    session_established(HttpResponse::Created(), resp, &settings)
}

#[post("/auth/login")]
pub async fn login(
    clients: web::Data<ServiceClients>,
    settings: web::Data<ApiSettings>,
    body: web::Json<LoginBody>,
) -> Result<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let resp = clients
        .auth_client()
        .login(LoginRequest {
            login: body.login,
            password: body.password,
        })
        .await?
        .into_inner();

    session_established(HttpResponse::Ok(), resp, &settings)
}

/// Idempotent; always clears the cookies
#[post("/auth/logout")]
pub async fn logout(
    clients: web::Data<ServiceClients>,
    settings: web::Data<ApiSettings>,
    session: Option<SessionToken>,
) -> Result<HttpResponse> {
    if let Some(SessionToken(token)) = session {
        clients
            .auth_client()
            .logout(LogoutRequest { token })
            .await?;
    }

    let mut csrf = actix_web::cookie::Cookie::new(CSRF_COOKIE, "");
    csrf.set_path("/");
    csrf.make_removal();

    Ok(HttpResponse::NoContent()
        .cookie(expired_session_cookie(settings.secure_cookies))
        .cookie(csrf)
        .finish())
}

#[get("/auth/session")]
pub async fn current_session(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    session: SessionToken,
) -> Result<HttpResponse> {
    let check = clients
        .auth_client()
        .check_session(CheckSessionRequest { token: session.0 })
        .await?
        .into_inner();

    let profile = clients
        .user_client()
        .get_user_by_id(GetUserByIdRequest {
            user_id: user.0.to_string(),
        })
        .await?
        .into_inner();

    Ok(HttpResponse::Ok().json(CurrentSessionResponse {
        user: profile.user,
        expires_in: check.expires_in,
    }))
}

#[put("/auth/password")]
pub async fn change_password(
    clients: web::Data<ServiceClients>,
    user: AuthenticatedUser,
    session: SessionToken,
    body: web::Json<ChangePasswordBody>,
) -> Result<HttpResponse> {
    body.validate()?;
    let body = body.into_inner();

    let resp = clients
        .auth_client()
        .change_password(ChangePasswordRequest {
            user_id: user.0.to_string(),
            old_password: body.old_password,
            new_password: body.new_password,
            current_token: session.0,
        })
        .await?
        .into_inner();

    info!(user_id = %user.0, revoked = resp.revoked_sessions, "Password changed");
    Ok(HttpResponse::Ok().json(ChangePasswordResponse {
        revoked_sessions: resp.revoked_sessions,
    }))
}
