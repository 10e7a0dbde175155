/// Configuration management for CSAT Service
///
/// Loads configuration from environment variables.
use anyhow::{anyhow, Result};
use db_pool::DbConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub grpc: GrpcConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port for health checks
    pub http_port: u16,
}

/// gRPC server configuration
#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8085),
        };

        let database = DbConfig::from_env("csat-service").map_err(|e| anyhow!(e))?;

        let grpc = GrpcConfig {
            port: std::env::var("GRPC_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50055),
        };

        Ok(Config {
            app,
            database,
            grpc,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_values() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::remove_var("PORT");
        std::env::remove_var("GRPC_PORT");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.host, "0.0.0.0");
        assert_eq!(config.app.http_port, 8085);
        assert_eq!(config.grpc.port, 50055);
        assert_eq!(config.database.service_name, "csat-service");
    }

    #[test]
    #[serial]
    fn test_missing_database_url() {
        std::env::remove_var("DATABASE_URL");
        assert!(Config::from_env().is_err());
    }
}
