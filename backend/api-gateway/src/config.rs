/// Gateway configuration
///
/// Loads configuration from environment variables.
use anyhow::{bail, Context, Result};
use std::fmt;

const MIN_CSRF_SECRET_LEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub services: ServiceEndpoints,
    pub cookies: CookieConfig,
    pub csrf: CsrfConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub env: String,
    pub host: String,
    pub port: u16,
}

/// Backend gRPC endpoints
#[derive(Debug, Clone)]
pub struct ServiceEndpoints {
    pub auth_url: String,
    pub user_url: String,
    pub event_url: String,
    pub image_url: String,
    pub csat_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Mark cookies `Secure`; off for local http development
    pub secure: bool,
}

#[derive(Clone)]
pub struct CsrfConfig {
    pub secret: String,
    pub ttl_secs: i64,
}

impl fmt::Debug for CsrfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            env: env_or("APP_ENV", "development"),
            host: env_or("SERVER_HOST", "0.0.0.0"),
            port: env_parse("SERVER_PORT", 8080),
        };

        let services = ServiceEndpoints {
            auth_url: env_or("AUTH_SERVICE_URL", "http://127.0.0.1:50051"),
            user_url: env_or("USER_SERVICE_URL", "http://127.0.0.1:50052"),
            event_url: env_or("EVENT_SERVICE_URL", "http://127.0.0.1:50053"),
            image_url: env_or("IMAGE_SERVICE_URL", "http://127.0.0.1:50054"),
            csat_url: env_or("CSAT_SERVICE_URL", "http://127.0.0.1:50055"),
            connect_timeout_secs: env_parse("GRPC_CONNECT_TIMEOUT_SECS", 5),
            request_timeout_secs: env_parse("GRPC_REQUEST_TIMEOUT_SECS", 10),
        };

        let cookies = CookieConfig {
            secure: env_parse("COOKIE_SECURE", server.env == "production"),
        };

        let secret = std::env::var("CSRF_SECRET").context("CSRF_SECRET must be set")?;
        if secret.len() < MIN_CSRF_SECRET_LEN {
            bail!(
                "CSRF_SECRET must be at least {} bytes",
                MIN_CSRF_SECRET_LEN
            );
        }
        let csrf = CsrfConfig {
            secret,
            ttl_secs: env_parse("CSRF_TTL_SECS", 3600),
        };
        if csrf.ttl_secs <= 0 {
            bail!("CSRF_TTL_SECS must be positive");
        }

        let upload = UploadConfig {
            max_bytes: env_parse("MAX_UPLOAD_BYTES", 10 * 1024 * 1024),
        };

        Ok(Config {
            server,
            services,
            cookies,
            csrf,
            upload,
        })
    }
}
