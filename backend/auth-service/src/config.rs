/// Configuration management for Auth Service
///
/// Loads configuration from environment variables.
use anyhow::{anyhow, Context, Result};
use db_pool::DbConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DbConfig,
    pub redis: RedisConfig,
    pub grpc: GrpcConfig,
    pub session: SessionConfig,
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

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (redis://host:port/db)
    pub url: String,
}

/// gRPC server configuration
#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub port: u16,
}

/// Session lifetime settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds, also the Redis key TTL
    pub ttl_secs: u64,
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
                .unwrap_or(8081),
        };

        let database = DbConfig::from_env("auth-service").map_err(|e| anyhow!(e))?;

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL").context("REDIS_URL environment variable not set")?,
        };

        let grpc = GrpcConfig {
            port: std::env::var("GRPC_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50051),
        };

        let session = SessionConfig {
            ttl_secs: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|ttl| *ttl > 0)
                .unwrap_or(86_400),
        };

        Ok(Config {
            app,
            database,
            redis,
            grpc,
            session,
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
        std::env::set_var("REDIS_URL", "redis://localhost");
        std::env::remove_var("PORT");
        std::env::remove_var("GRPC_PORT");
        std::env::remove_var("SESSION_TTL_SECS");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.env, "development");
        assert_eq!(config.app.http_port, 8081);
        assert_eq!(config.grpc.port, 50051);
        assert_eq!(config.session.ttl_secs, 86_400);
        assert_eq!(config.database.service_name, "auth-service");
    }

    #[test]
    #[serial]
    fn test_zero_session_ttl_falls_back() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::set_var("REDIS_URL", "redis://localhost");
        std::env::set_var("SESSION_TTL_SECS", "0");

        let config = Config::from_env().unwrap();
        assert_eq!(config.session.ttl_secs, 86_400);

        std::env::remove_var("SESSION_TTL_SECS");
    }

    #[test]
    #[serial]
    fn test_missing_redis_url() {
        std::env::set_var("DATABASE_URL", "postgres://test");
        std::env::remove_var("REDIS_URL");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("REDIS_URL"));
    }
}
