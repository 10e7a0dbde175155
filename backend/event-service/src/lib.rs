pub mod config;
pub mod grpc;
pub mod models;
pub mod repository;
pub mod services;

pub use services::{EventService, FavoriteService};
