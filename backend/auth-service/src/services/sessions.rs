//! Redis-backed session store
//!
//! `eventhub:session:{token}` holds the user id and expires with the session.
//! `eventhub:user_sessions:{user_id}` is a set of that user's tokens so all of
//! them can be revoked at once; stale members are dropped lazily.
use chrono::{Duration, Utc};
use error_types::{ServiceError, ServiceResult};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis_utils::keys::SessionKey;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Session, SessionInfo};
use crate::security::{generate_session_token, token::is_well_formed};

const TOKEN_ALLOCATION_ATTEMPTS: usize = 3;

#[derive(Clone)]
pub struct SessionStore {
    redis: ConnectionManager,
    ttl_secs: u64,
}

fn redis_error(err: redis::RedisError) -> ServiceError {
    ServiceError::internal(anyhow::anyhow!("session store error: {}", err))
}

impl SessionStore {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Issue a new session for `user_id`
    pub async fn create(&self, user_id: Uuid) -> ServiceResult<Session> {
        let mut conn = self.redis.clone();

        for _ in 0..TOKEN_ALLOCATION_ATTEMPTS {
            let token = generate_session_token();
            let key = SessionKey::token(&token);

            // NX: never overwrite a live session
            let stored: Option<String> = redis::cmd("SET")
                .arg(&key)
                .arg(user_id.to_string())
                .arg("EX")
                .arg(self.ttl_secs)
                .arg("NX")
                .query_async(&mut conn)
                .await
                .map_err(redis_error)?;

            if stored.is_none() {
                warn!("Session token collision, regenerating");
                continue;
            }

            let index = SessionKey::user_index(user_id);
            redis::pipe()
                .atomic()
                .sadd(&index, &token)
                .ignore()
                .expire(&index, self.ttl_secs as i64)
                .ignore()
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(redis_error)?;

            debug!(user_id = %user_id, "Session created");
            return Ok(Session {
                token,
                user_id,
                expires_at: Utc::now() + Duration::seconds(self.ttl_secs as i64),
                ttl_secs: self.ttl_secs,
            });
        }

        Err(ServiceError::internal(anyhow::anyhow!(
            "could not allocate a unique session token"
        )))
    }

    /// Look up a live session. Absent, expired and malformed tokens all yield `None`.
    pub async fn get(&self, token: &str) -> ServiceResult<Option<SessionInfo>> {
        if !is_well_formed(token) {
            return Ok(None);
        }

        let key = SessionKey::token(token);
        let mut conn = self.redis.clone();
        let (value, ttl): (Option<String>, i64) = redis::pipe()
            .get(&key)
            .cmd("TTL")
            .arg(&key)
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;

        // TTL is -2 when the key vanished between the two commands
        let Some(raw) = value.filter(|_| ttl > 0) else {
            return Ok(None);
        };

        match Uuid::parse_str(&raw) {
            Ok(user_id) => Ok(Some(SessionInfo {
                user_id,
                expires_in: ttl,
            })),
            Err(_) => {
                warn!("Corrupt session value, discarding");
                let _: () = conn.del(&key).await.map_err(redis_error)?;
                Ok(None)
            }
        }
    }

    /// Remove a session. Returns false when it did not exist.
    pub async fn delete(&self, token: &str) -> ServiceResult<bool> {
        if !is_well_formed(token) {
            return Ok(false);
        }

        let key = SessionKey::token(token);
        let mut conn = self.redis.clone();
        let owner: Option<String> = conn.get(&key).await.map_err(redis_error)?;
        let removed: u32 = conn.del(&key).await.map_err(redis_error)?;

        if let Some(user_id) = owner.and_then(|raw| Uuid::parse_str(&raw).ok()) {
            let _: () = conn
                .srem(SessionKey::user_index(user_id), token)
                .await
                .map_err(redis_error)?;
        }

        Ok(removed > 0)
    }

    /// Revoke every session of `user_id` except `keep`. Returns how many were live.
    pub async fn revoke_all_except(&self, user_id: Uuid, keep: Option<&str>) -> ServiceResult<u32> {
        let index = SessionKey::user_index(user_id);
        let mut conn = self.redis.clone();
        let tokens: Vec<String> = conn.smembers(&index).await.map_err(redis_error)?;

        let mut revoked = 0u32;
        for token in tokens.iter().filter(|t| Some(t.as_str()) != keep) {
            let removed: u32 = conn
                .del(SessionKey::token(token))
                .await
                .map_err(redis_error)?;
            let _: () = conn.srem(&index, token).await.map_err(redis_error)?;
            revoked += removed;
        }

        debug!(user_id = %user_id, revoked, "Sessions revoked");
        Ok(revoked)
    }
}
