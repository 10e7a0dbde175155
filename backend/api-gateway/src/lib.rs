pub mod clients;
pub mod config;
pub mod csrf;
pub mod error;
pub mod middleware;
pub mod models;
pub mod rest_api;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

/// Report malformed JSON bodies in the shared error format
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Report malformed query strings in the shared error format
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
