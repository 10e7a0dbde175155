//! Cookie session middleware
//!
//! Resolves the `session_id` cookie through auth-service and attaches the
//! caller to the request. It never rejects by itself; handlers that need a
//! caller take [`AuthenticatedUser`], which yields 401 when absent.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use async_trait::async_trait;
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tonic::Code;
use tracing::{debug, error};
use uuid::Uuid;

use crate::clients::proto::auth::CheckSessionRequest;
use crate::clients::ServiceClients;
use crate::error::AppError;

pub const SESSION_COOKIE: &str = "session_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Uuid);

/// Raw session token of the authenticated caller
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Resolves a session token to its user
#[async_trait]
pub trait SessionValidator: Send + Sync {
    /// `Ok(None)` for unknown or expired sessions
    async fn validate(&self, token: &str) -> Result<Option<Uuid>, tonic::Status>;
}

#[async_trait]
impl SessionValidator for ServiceClients {
    async fn validate(&self, token: &str) -> Result<Option<Uuid>, tonic::Status> {
        let request = CheckSessionRequest {
            token: token.to_string(),
        };
        match self.auth_client().check_session(request).await {
            Ok(resp) => Ok(Uuid::parse_str(&resp.into_inner().user_id).ok()),
            Err(status) if status.code() == Code::Unauthenticated => Ok(None),
            Err(status) => Err(status),
        }
    }
}

pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token.to_string())
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

pub fn expired_session_cookie(secure: bool) -> Cookie<'static> {
    let mut cookie = session_cookie("", 0, secure);
    cookie.make_removal();
    cookie
}

pub struct SessionMiddleware {
    validator: Arc<dyn SessionValidator>,
}

impl SessionMiddleware {
    pub fn new(validator: Arc<dyn SessionValidator>) -> Self {
        Self { validator }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            validator: self.validator.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    validator: Arc<dyn SessionValidator>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let validator = self.validator.clone();

        Box::pin(async move {
            let token = req
                .cookie(SESSION_COOKIE)
                .map(|c| c.value().to_string())
                .filter(|t| !t.is_empty());

            if let Some(token) = token {
                match validator.validate(&token).await {
                    Ok(Some(user_id)) => {
                        req.extensions_mut().insert(AuthenticatedUser(user_id));
                        req.extensions_mut().insert(SessionToken(token));
                    }
                    Ok(None) => debug!("Ignoring stale session cookie"),
                    Err(status) => {
                        error!(code = ?status.code(), "Session check failed: {}", status.message());
                        return Err(AppError::Unavailable("auth-service").into());
                    }
                }
            }

            service.call(req).await
        })
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthenticatedUser>()
                .copied()
                .ok_or(AppError::Unauthorized),
        )
    }
}

impl FromRequest for SessionToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<SessionToken>()
                .cloned()
                .ok_or(AppError::Unauthorized),
        )
    }
}
