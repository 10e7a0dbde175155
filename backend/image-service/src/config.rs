/// Configuration management for Image Service
///
/// Loads configuration from environment variables.
use anyhow::{bail, Result};
use std::path::PathBuf;

pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub grpc: GrpcConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub host: String,
    /// HTTP port for health checks
    pub http_port: u16,
}

#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding stored images
    pub dir: PathBuf,
    /// Prefix joined with the file name to build public URLs
    pub public_prefix: String,
    /// Largest accepted upload
    pub max_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8084),
        };

        let grpc = GrpcConfig {
            port: std::env::var("GRPC_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50054),
        };

        let max_bytes = std::env::var("IMAGE_MAX_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_BYTES);
        if max_bytes == 0 {
            bail!("IMAGE_MAX_BYTES must be greater than zero");
        }

        let storage = StorageConfig {
            dir: std::env::var("IMAGE_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data/images")),
            public_prefix: std::env::var("IMAGE_PUBLIC_PREFIX")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "/api/v1/images".to_string()),
            max_bytes,
        };

        Ok(Config { app, grpc, storage })
    }
}
