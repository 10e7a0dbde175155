/// Redis key naming conventions
use uuid::Uuid;

/// Base namespace for all Redis keys
const NAMESPACE: &str = "eventhub";

/// Session keys
pub struct SessionKey;

impl SessionKey {
    /// session token -> user_id, expires with the session
    pub fn token(token: &str) -> String {
        format!("{}:session:{}", NAMESPACE, token)
    }

    /// Set of live session tokens for a user, used for bulk revocation
    pub fn user_index(user_id: Uuid) -> String {
        format!("{}:user_sessions:{}", NAMESPACE, user_id)
    }
}
