//! Double-submit CSRF protection for cookie sessions
//!
//! Authenticated safe requests receive a fresh token in the `X-CSRF-Token`
//! header and a script-readable `csrf_token` cookie. Authenticated mutating
//! requests must echo the cookie value in the header, and the token must
//! verify against the caller's session. Requests without a session pass.

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::http::Method;
use actix_web::{Error, HttpMessage};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::csrf::CsrfTokens;
use crate::error::AppError;
use crate::middleware::session::SessionToken;

pub const CSRF_HEADER: &str = "x-csrf-token";
pub const CSRF_COOKIE: &str = "csrf_token";

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

pub fn csrf_cookie(token: &str, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build(CSRF_COOKIE, token.to_string())
        .path("/")
        .http_only(false)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(max_age_secs))
        .finish()
}

/// Check a mutating request's header/cookie pair against the session
fn check_request(
    tokens: &CsrfTokens,
    req: &ServiceRequest,
    session_token: &str,
    now: i64,
) -> Result<(), AppError> {
    let header = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Forbidden("missing CSRF token".to_string()))?;
    let cookie = req
        .cookie(CSRF_COOKIE)
        .ok_or_else(|| AppError::Forbidden("missing CSRF cookie".to_string()))?;

    if cookie.value() != header {
        return Err(AppError::Forbidden("CSRF token mismatch".to_string()));
    }

    tokens
        .verify(header, session_token, now)
        .map_err(|e| AppError::Forbidden(e.to_string()))
}

pub struct CsrfMiddleware {
    tokens: Arc<CsrfTokens>,
    secure_cookie: bool,
}

impl CsrfMiddleware {
    pub fn new(tokens: Arc<CsrfTokens>, secure_cookie: bool) -> Self {
        Self {
            tokens,
            secure_cookie,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CsrfMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = CsrfMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfMiddlewareService {
            service: Rc::new(service),
            tokens: self.tokens.clone(),
            secure_cookie: self.secure_cookie,
        }))
    }
}

pub struct CsrfMiddlewareService<S> {
    service: Rc<S>,
    tokens: Arc<CsrfTokens>,
    secure_cookie: bool,
}

impl<S, B> Service<ServiceRequest> for CsrfMiddlewareService<S>
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
        let tokens = self.tokens.clone();
        let secure_cookie = self.secure_cookie;

        Box::pin(async move {
            let session = req.extensions().get::<SessionToken>().cloned();
            let Some(SessionToken(session_token)) = session else {
                return service.call(req).await;
            };

            let now = chrono::Utc::now().timestamp();
            let safe = is_safe(req.method());

            if !safe {
                if let Err(e) = check_request(&tokens, &req, &session_token, now) {
                    warn!(method = %req.method(), path = %req.path(), "CSRF check failed: {}", e);
                    return Err(e.into());
                }
                return service.call(req).await;
            }

            let mut res = service.call(req).await?;

            let token = tokens.issue(&session_token, now);
            match HeaderValue::from_str(&token) {
                Ok(value) => {
                    res.headers_mut()
                        .insert(HeaderName::from_static(CSRF_HEADER), value);
                }
                Err(e) => warn!("Invalid CSRF header value: {}", e),
            }
            let cookie = csrf_cookie(&token, tokens.ttl_secs(), secure_cookie);
            if let Err(e) = res.response_mut().add_cookie(&cookie) {
                warn!("Failed to set CSRF cookie: {}", e);
            }
            debug!("Issued CSRF token");

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::session::tests::StubValidator;
    use crate::middleware::session::{SessionMiddleware, SESSION_COOKIE};
    use actix_web::{test, web, App, HttpResponse};
    use std::collections::HashMap;
    use uuid::Uuid;

    const SESSION: &str = "session-token";

    fn tokens() -> Arc<CsrfTokens> {
        Arc::new(CsrfTokens::new(b"csrf-test-secret-csrf-test-secret", 3600).unwrap())
    }

    macro_rules! app {
        () => {{
            let mut sessions = HashMap::new();
            sessions.insert(SESSION.to_string(), Uuid::new_v4());
            test::init_service(
                App::new()
                    .wrap(CsrfMiddleware::new(tokens(), false))
                    .wrap(SessionMiddleware::new(Arc::new(StubValidator(Some(sessions)))))
                    .route("/things", web::get().to(HttpResponse::Ok))
                    .route("/things", web::post().to(HttpResponse::Created)),
            )
            .await
        }};
    }

    fn status_of<B>(result: Result<ServiceResponse<B>, Error>) -> actix_web::http::StatusCode {
        match result {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        }
    }

    #[actix_web::test]
    async fn test_authenticated_get_issues_token() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/things")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 200);
        let header = resp.headers().get(CSRF_HEADER).unwrap().to_str().unwrap();
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == CSRF_COOKIE)
            .unwrap();
        assert_eq!(cookie.value(), header);
        assert_eq!(cookie.http_only(), Some(false));
        let now = chrono::Utc::now().timestamp();
        assert!(tokens().verify(header, SESSION, now).is_ok());
    }

    #[actix_web::test]
    async fn test_anonymous_requests_pass_without_token() {
        let app = app!();
        let req = test::TestRequest::get().uri("/things").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.headers().get(CSRF_HEADER).is_none());

        let req = test::TestRequest::post().uri("/things").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    #[actix_web::test]
    async fn test_mutation_without_token_forbidden() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/things")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .to_request();
        assert_eq!(status_of(test::try_call_service(&app, req).await), 403);
    }

    #[actix_web::test]
    async fn test_mutation_with_mismatched_token_forbidden() {
        let app = app!();
        let now = chrono::Utc::now().timestamp();
        let token = tokens().issue(SESSION, now);
        let other = tokens().issue("someone-else", now);

        let req = test::TestRequest::post()
            .uri("/things")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .cookie(Cookie::new(CSRF_COOKIE, token))
            .insert_header((CSRF_HEADER, other.clone()))
            .to_request();
        assert_eq!(status_of(test::try_call_service(&app, req).await), 403);

        // Header and cookie agree but belong to another session
        let req = test::TestRequest::post()
            .uri("/things")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .cookie(Cookie::new(CSRF_COOKIE, other.clone()))
            .insert_header((CSRF_HEADER, other))
            .to_request();
        assert_eq!(status_of(test::try_call_service(&app, req).await), 403);
    }

    #[actix_web::test]
    async fn test_mutation_with_valid_token_proceeds() {
        let app = app!();
        let token = tokens().issue(SESSION, chrono::Utc::now().timestamp());

        let req = test::TestRequest::post()
            .uri("/things")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .cookie(Cookie::new(CSRF_COOKIE, token.clone()))
            .insert_header((CSRF_HEADER, token))
            .to_request();
        assert_eq!(status_of(test::try_call_service(&app, req).await), 201);
    }

    #[actix_web::test]
    async fn test_expired_token_forbidden() {
        let app = app!();
        let stale = tokens().issue(SESSION, chrono::Utc::now().timestamp() - 7200);

        let req = test::TestRequest::post()
            .uri("/things")
            .cookie(Cookie::new(SESSION_COOKIE, SESSION))
            .cookie(Cookie::new(CSRF_COOKIE, stale.clone()))
            .insert_header((CSRF_HEADER, stale))
            .to_request();
        assert_eq!(status_of(test::try_call_service(&app, req).await), 403);
    }
}
