use error_types::{DatabaseError, ServiceError, ServiceResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::models::{ProfileChanges, UserProfile};
use crate::repository::UserRepository;

/// Normalize then validate a profile update
pub fn prepare_changes(mut changes: ProfileChanges) -> ServiceResult<ProfileChanges> {
    changes.username = changes.username.map(|u| u.trim().to_string());
    changes.email = changes.email.map(|e| e.trim().to_lowercase());

    changes.validate().map_err(|e| {
        let mut fields: Vec<String> = e.field_errors().keys().map(|f| f.to_string()).collect();
        fields.sort();
        ServiceError::invalid_input(format!("invalid {}", fields.join(", ")))
    })?;

    if let Some(username) = &changes.username {
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(ServiceError::invalid_input(
                "username may contain only letters, digits, '_' and '.'",
            ));
        }
    }

    Ok(changes)
}

fn profile_conflict(err: DatabaseError) -> ServiceError {
    match err.constraint() {
        Some("users_username_key") => ServiceError::conflict("username already taken"),
        Some("users_email_key") => ServiceError::conflict("email already taken"),
        _ => ServiceError::from(err),
    }
}

pub struct ProfileService {
    users: UserRepository,
}

impl ProfileService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    pub async fn get_user(&self, user_id: Uuid) -> ServiceResult<UserProfile> {
        self.users
            .get_profile(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user"))
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> ServiceResult<UserProfile> {
        let changes = prepare_changes(changes)?;
        if !changes.is_empty() {
            let updated = self
                .users
                .update_profile(user_id, &changes)
                .await
                .map_err(|e| profile_conflict(DatabaseError::from(e)))?;
            if !updated {
                return Err(ServiceError::not_found("user"));
            }
            info!(event = "profile_updated", user_id = %user_id);
        }
        self.get_user(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_changes_normalizes() {
        let changes = prepare_changes(ProfileChanges {
            username: Some("  bob_2 ".to_string()),
            email: Some("Bob@Example.COM".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.username.as_deref(), Some("bob_2"));
        assert_eq!(changes.email.as_deref(), Some("bob@example.com"));
    }

    #[test]
    fn test_prepare_changes_rejects_invalid_email() {
        let err = prepare_changes(ProfileChanges {
            email: Some("nope".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid email");
    }

    #[test]
    fn test_prepare_changes_rejects_long_about() {
        let err = prepare_changes(ProfileChanges {
            about: Some("a".repeat(501)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput { .. }));
    }

    #[test]
    fn test_prepare_changes_allows_clearing() {
        let changes = prepare_changes(ProfileChanges {
            avatar_url: Some(String::new()),
            about: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_username_charset() {
        assert!(prepare_changes(ProfileChanges {
            username: Some("bad name".to_string()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_profile_conflict_names_field() {
        let err = profile_conflict(DatabaseError::UniqueViolation {
            constraint: "users_email_key".to_string(),
        });
        assert_eq!(err.to_string(), "email already taken");
    }
}
