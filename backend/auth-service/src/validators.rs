//! Input validation for account data
use error_types::{ServiceError, ServiceResult};
use validator::{Validate, ValidationErrors};

use crate::security::validate_password_strength;

#[derive(Debug, Clone, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    pub fn new(username: &str, email: &str, password: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        }
    }

    /// Field rules, then username charset, then password length
    pub fn check(&self) -> ServiceResult<()> {
        self.validate().map_err(|e| invalid_fields(&e))?;
        validate_username_chars(&self.username)?;
        validate_password_strength(&self.password)
    }
}

/// Usernames are `[A-Za-z0-9_.]`
pub fn validate_username_chars(username: &str) -> ServiceResult<()> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        Ok(())
    } else {
        Err(ServiceError::invalid_input(
            "username may contain only letters, digits, '_' and '.'",
        ))
    }
}

/// Collapse validator output into one stable message
pub fn invalid_fields(errors: &ValidationErrors) -> ServiceError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    ServiceError::invalid_input(format!("invalid {}", fields.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_input() {
        let input = RegisterInput::new("alice_01", "Alice@Example.com ", "long enough pw");
        assert_eq!(input.email, "alice@example.com");
        assert!(input.check().is_ok());
    }

    #[test]
    fn test_short_username() {
        let input = RegisterInput::new("al", "alice@example.com", "long enough pw");
        let err = input.check().unwrap_err();
        assert_eq!(err.to_string(), "invalid username");
    }

    #[test]
    fn test_bad_email_and_username() {
        let input = RegisterInput::new("a", "not-an-email", "long enough pw");
        let err = input.check().unwrap_err();
        assert_eq!(err.to_string(), "invalid email, username");
    }

    #[test]
    fn test_username_charset() {
        let input = RegisterInput::new("alice smith", "alice@example.com", "long enough pw");
        assert!(matches!(
            input.check(),
            Err(ServiceError::InvalidInput { .. })
        ));
        assert!(validate_username_chars("alice.smith_2").is_ok());
        assert!(validate_username_chars("alice;drop").is_err());
    }

    #[test]
    fn test_short_password() {
        let input = RegisterInput::new("alice", "alice@example.com", "1234");
        assert!(input.check().is_err());
    }
}
