//! HTTP request and response bodies
//!
//! Downstream response messages are serialized as-is; the types here cover
//! request bodies and responses the gateway shapes itself.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::clients::proto::auth::AuthUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    /// Username or email
    #[validate(length(min = 1, max = 255))]
    pub login: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordBody {
    #[validate(length(min = 1, max = 128))]
    pub old_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

/// Absent fields stay unchanged; an empty `avatar_url` or `about` clears it
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileBody {
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub about: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EventBody {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub location: Option<String>,
    /// Unix seconds
    pub event_start: i64,
    pub event_end: i64,
    pub category_id: Option<i32>,
    /// 0 means unlimited
    #[serde(default)]
    #[validate(range(min = 0))]
    pub capacity: i32,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnswerBody {
    pub question_id: i32,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

impl PageQuery {
    /// Zero lets the backend apply its default page size
    pub fn limit(&self) -> i32 {
        self.limit.unwrap_or(0)
    }

    pub fn offset(&self) -> i32 {
        self.offset.unwrap_or(0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub category: Option<i32>,
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// Register/login response; the session token only travels in the cookie
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<AuthUser>,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct CurrentSessionResponse<T: Serialize> {
    pub user: Option<T>,
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub revoked_sessions: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_body_defaults() {
        let body: EventBody = serde_json::from_str(
            r#"{"title":"Gig","event_start":1900000000,"event_end":1900003600}"#,
        )
        .unwrap();
        assert_eq!(body.capacity, 0);
        assert_eq!(body.description, "");
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_answer_rating_range() {
        let body = AnswerBody {
            question_id: 1,
            rating: 6,
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn test_register_body_validation() {
        let body = RegisterBody {
            username: "ab".to_string(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = body.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("username"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_session_response_has_no_token() {
        let json = serde_json::to_value(SessionResponse {
            user: None,
            expires_at: 10,
        })
        .unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["expires_at"], 10);
    }
}
