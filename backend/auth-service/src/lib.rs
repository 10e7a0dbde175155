pub mod config;
pub mod db;
pub mod grpc;
pub mod models;
pub mod security;
pub mod services;
pub mod validators;

pub use models::{Session, SessionInfo, User};
pub use services::{AuthService, SessionStore};
