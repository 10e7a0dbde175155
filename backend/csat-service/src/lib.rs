pub mod config;
pub mod grpc;
pub mod models;
pub mod repository;
pub mod service;
pub mod statistics;

pub use service::CsatService;
