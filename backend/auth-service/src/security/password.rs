/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use error_types::{ServiceError, ServiceResult};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

/// Hash a password using Argon2id.
/// Returns the PHC string stored in `users.password_hash`.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    validate_password_strength(password)?;

    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::internal(anyhow::anyhow!("failed to hash password: {}", e)))
}

/// Verify a password against a stored hash.
/// Returns `Ok(false)` on mismatch; a malformed hash is an internal error.
pub fn verify_password(password: &str, hash: &str) -> ServiceResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        ServiceError::internal(anyhow::anyhow!("invalid password hash format: {}", e))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Length bounds only; composition rules are left to the client.
pub fn validate_password_strength(password: &str) -> ServiceResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(ServiceError::invalid_input(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(ServiceError::invalid_input(format!(
            "password must be at most {} characters",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "correct horse battery";
        let hash = hash_password(password).unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(!verify_password("incorrect horse", &hash).unwrap());
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = hash_password("repeatable-secret").unwrap();
        let b = hash_password("repeatable-secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_too_short() {
        let err = hash_password("short").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput { .. }));
    }

    #[test]
    fn test_password_too_long() {
        let long = "x".repeat(MAX_PASSWORD_LEN + 1);
        assert!(validate_password_strength(&long).is_err());
        assert!(validate_password_strength(&"x".repeat(MAX_PASSWORD_LEN)).is_ok());
    }

    #[test]
    fn test_malformed_hash_is_internal() {
        let err = verify_password("whatever1", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, ServiceError::Internal { .. }));
    }
}
