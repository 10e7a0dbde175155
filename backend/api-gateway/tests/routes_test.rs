//! Router behaviour that needs no live backend: routing, auth gating and
//! request validation all happen before any gRPC call.

use actix_web::{test, web, App};
use std::sync::Arc;

use api_gateway::clients::ServiceClients;
use api_gateway::config::ServiceEndpoints;
use api_gateway::csrf::CsrfTokens;
use api_gateway::middleware::{CsrfMiddleware, SessionMiddleware, SessionValidator};
use api_gateway::rest_api::{self, ApiSettings};

fn unreachable_clients() -> ServiceClients {
    let url = "http://127.0.0.1:1".to_string();
    let endpoints = ServiceEndpoints {
        auth_url: url.clone(),
        user_url: url.clone(),
        event_url: url.clone(),
        image_url: url.clone(),
        csat_url: url,
        connect_timeout_secs: 1,
        request_timeout_secs: 1,
    };
    ServiceClients::new(&endpoints, 1024).expect("clients")
}

macro_rules! gateway {
    () => {{
        let clients = unreachable_clients();
        let validator: Arc<dyn SessionValidator> = Arc::new(clients.clone());
        let tokens = Arc::new(CsrfTokens::new(b"routes-test-secret-routes-test-xx", 3600).unwrap());
        test::init_service(
            App::new()
                .wrap(CsrfMiddleware::new(tokens, false))
                .wrap(SessionMiddleware::new(validator))
                .app_data(web::Data::new(clients))
                .app_data(web::Data::new(ApiSettings {
                    secure_cookies: false,
                    max_upload_bytes: 1024,
                }))
                .app_data(api_gateway::json_config())
                .app_data(api_gateway::query_config())
                .route("/health", web::get().to(api_gateway::health))
                .configure(rest_api::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_health() {
    let app = gateway!();
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_protected_routes_require_session() {
    let app = gateway!();
    let cases = [
        test::TestRequest::get().uri("/api/v1/favorites"),
        test::TestRequest::get().uri("/api/v1/events/feed"),
        test::TestRequest::get().uri("/api/v1/auth/session"),
        test::TestRequest::put()
            .uri("/api/v1/profile")
            .set_json(serde_json::json!({ "about": "hi" })),
        test::TestRequest::post().uri("/api/v1/users/00000000-0000-0000-0000-000000000001/subscription"),
        test::TestRequest::post()
            .uri("/api/v1/csat/answers")
            .set_json(serde_json::json!({ "question_id": 1, "rating": 5 })),
        test::TestRequest::delete().uri("/api/v1/events/00000000-0000-0000-0000-000000000001"),
    ];

    for req in cases {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "UNAUTHENTICATED");
    }
}

#[actix_web::test]
async fn test_register_validates_before_calling_backend() {
    let app = gateway!();
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/register")
        .set_json(serde_json::json!({
            "username": "al",
            "email": "alice@example.com",
            "password": "long-enough-password"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "invalid username");
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let app = gateway!();
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_unreachable_backend_is_server_error() {
    let app = gateway!();
    let req = test::TestRequest::get().uri("/api/v1/events/categories").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_server_error());
}

#[actix_web::test]
async fn test_logout_without_session_clears_cookie() {
    let app = gateway!();
    let req = test::TestRequest::post().uri("/api/v1/auth/logout").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 204);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == "session_id")
        .expect("session cookie");
    assert_eq!(cleared.value(), "");
}
