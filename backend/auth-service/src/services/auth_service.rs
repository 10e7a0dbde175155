/// Authentication business logic: accounts in Postgres, sessions in Redis
use error_types::{DatabaseError, ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::users;
use crate::models::{Session, SessionInfo, User};
use crate::security::{hash_password, validate_password_strength, verify_password};
use crate::services::sessions::SessionStore;
use crate::validators::RegisterInput;

/// Same message for unknown login and wrong password
pub const INVALID_CREDENTIALS: &str = "invalid credentials";
pub const INVALID_SESSION: &str = "session not found or expired";

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    sessions: SessionStore,
}

impl AuthService {
    pub fn new(pool: PgPool, sessions: SessionStore) -> Self {
        Self { pool, sessions }
    }

    /// Create an account and log it in
    pub async fn register(&self, input: RegisterInput) -> ServiceResult<(User, Session)> {
        input.check()?;

        let password = input.password.clone();
        let password_hash = hash_blocking(password).await?;

        let user = users::create_user(&self.pool, &input.username, &input.email, &password_hash)
            .await
            .map_err(|e| registration_conflict(DatabaseError::from(e)))?;

        let session = self.sessions.create(user.id).await?;

        info!(
            event = "user_registration_success",
            user_id = %user.id,
            username = %user.username
        );
        Ok((user, session))
    }

    /// Verify credentials and issue a session
    pub async fn login(&self, login: &str, password: &str) -> ServiceResult<(User, Session)> {
        let login = login.trim();
        if login.is_empty() || password.is_empty() {
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        }

        let user = match users::find_by_login(&self.pool, login).await? {
            Some(user) => user,
            None => {
                warn!(event = "login_unknown_user");
                return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
            }
        };

        if !verify_blocking(password.to_string(), user.password_hash.clone()).await? {
            warn!(event = "login_wrong_password", user_id = %user.id);
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        }

        let session = self.sessions.create(user.id).await?;
        info!(event = "user_login_success", user_id = %user.id);
        Ok((user, session))
    }

    /// Idempotent: an unknown token is not an error
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        if self.sessions.delete(token).await? {
            info!(event = "user_logout");
        }
        Ok(())
    }

    pub async fn check_session(&self, token: &str) -> ServiceResult<SessionInfo> {
        self.sessions
            .get(token)
            .await?
            .ok_or_else(|| ServiceError::unauthenticated(INVALID_SESSION))
    }

    /// Replace the password and revoke all other sessions
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
        keep_token: Option<&str>,
    ) -> ServiceResult<u32> {
        validate_password_strength(new_password)?;

        let user = users::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))?;

        if !verify_blocking(old_password.to_string(), user.password_hash.clone()).await? {
            warn!(event = "change_password_wrong_password", user_id = %user_id);
            return Err(ServiceError::unauthenticated(INVALID_CREDENTIALS));
        }

        let new_hash = hash_blocking(new_password.to_string()).await?;
        if !users::update_password(&self.pool, user_id, &new_hash).await? {
            return Err(ServiceError::not_found("user"));
        }

        let revoked = self.sessions.revoke_all_except(user_id, keep_token).await?;
        info!(event = "password_changed", user_id = %user_id, revoked_sessions = revoked);
        Ok(revoked)
    }
}

/// Name the taken field instead of the constraint
pub fn registration_conflict(err: DatabaseError) -> ServiceError {
    match err.constraint() {
        Some("users_username_key") => ServiceError::conflict("username already taken"),
        Some("users_email_key") => ServiceError::conflict("email already taken"),
        _ => ServiceError::from(err),
    }
}

// Argon2 is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String) -> ServiceResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(ServiceError::internal)?
}

async fn verify_blocking(password: String, hash: String) -> ServiceResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(ServiceError::internal)?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_conflict_message() {
        let err = registration_conflict(DatabaseError::UniqueViolation {
            constraint: "users_username_key".to_string(),
        });
        assert!(matches!(err, ServiceError::Conflict { ref message } if message == "username already taken"));
    }

    #[test]
    fn test_email_conflict_message() {
        let err = registration_conflict(DatabaseError::UniqueViolation {
            constraint: "users_email_key".to_string(),
        });
        assert_eq!(err.to_string(), "email already taken");
        assert_eq!(err.to_status().code(), tonic::Code::AlreadyExists);
    }

    #[test]
    fn test_other_database_errors_pass_through() {
        let err = registration_conflict(DatabaseError::Other {
            message: "connection reset".to_string(),
        });
        assert!(matches!(err, ServiceError::Database { .. }));
    }

    #[tokio::test]
    async fn test_blocking_hash_round_trip() {
        let hash = hash_blocking("blocking-pool-pw".to_string()).await.unwrap();
        assert!(verify_blocking("blocking-pool-pw".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_blocking("other-password".to_string(), hash).await.unwrap());
    }
}
