pub mod auth_service;
pub mod sessions;

pub use auth_service::AuthService;
pub use sessions::SessionStore;
