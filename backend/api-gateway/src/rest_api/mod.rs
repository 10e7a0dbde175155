//! REST endpoints under `/api/v1`

use actix_web::web;

pub mod auth;
pub mod csat;
pub mod events;
pub mod images;
pub mod users;

/// Per-process HTTP settings shared by handlers
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::current_session)
            .service(auth::change_password)
            .service(users::update_profile)
            .service(users::upload_avatar)
            .service(users::get_user)
            .service(users::subscription_status)
            .service(users::subscribe)
            .service(users::unsubscribe)
            .service(users::subscribers)
            .service(users::subscriptions)
            .service(users::user_events)
            // Static event paths must precede `/events/{id}`
            .service(events::search_events)
            .service(events::upcoming_events)
            .service(events::past_events)
            .service(events::feed)
            .service(events::categories)
            .service(events::create_event)
            .service(events::get_event)
            .service(events::update_event)
            .service(events::delete_event)
            .service(events::add_favorite)
            .service(events::remove_favorite)
            .service(events::favorites)
            .service(images::upload_image)
            .service(images::get_image)
            .service(images::delete_image)
            .service(csat::list_tests)
            .service(csat::get_test)
            .service(csat::statistics)
            .service(csat::submit_answer),
    );
}
