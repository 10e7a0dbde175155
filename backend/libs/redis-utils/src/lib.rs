use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionInfo, IntoConnectionInfo};
use std::time::Duration;
use tracing::info;

pub mod keys;

/// Redis connection holder.
///
/// `ConnectionManager` multiplexes one connection and reconnects on failure,
/// so callers clone it per operation instead of pooling.
#[derive(Clone)]
pub struct RedisPool {
    manager: ConnectionManager,
}

impl RedisPool {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let info: ConnectionInfo = redis_url
            .into_connection_info()
            .context("failed to parse REDIS_URL connection string")?;
        let addr = info.addr.to_string();

        let client = Client::open(info).context("failed to construct Redis client")?;
        let manager = tokio::time::timeout(Duration::from_secs(10), ConnectionManager::new(client))
            .await
            .context("timed out connecting to Redis")?
            .context("failed to initialize Redis connection manager")?;

        info!(addr = %addr, "Redis connection established");
        Ok(Self { manager })
    }

    pub fn manager(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Round-trip check used by readiness probes
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .context("Redis PING failed")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = RedisPool::connect("not a url").await;
        let err = result.err().expect("malformed URL must fail");
        assert!(err.to_string().contains("REDIS_URL"));
    }
}
