use crate::config::{BCRYPT_COST, PASSWORD_MAX_BYTES, PASSWORD_MIN_BYTES};
use crate::error::{IdentityError, Result};

/// bcrypt-backed password hashing (§4.6), replacing the argon2 the rest of
/// the engine workspace favors elsewhere — this spec names bcrypt at cost 12
/// explicitly. Rejects passwords outside bcrypt's 8-72 byte window up front
/// rather than let the 72-byte truncation silently weaken a longer password.
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn hash(password: &str) -> Result<String> {
        Self::validate_length(password)?;
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| IdentityError::Hashing(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(|e| IdentityError::Hashing(e.to_string()))
    }

    fn validate_length(password: &str) -> Result<()> {
        let len = password.len();
        if len < PASSWORD_MIN_BYTES || len > PASSWORD_MAX_BYTES {
            return Err(IdentityError::Hashing(format!(
                "password must be between {PASSWORD_MIN_BYTES} and {PASSWORD_MAX_BYTES} bytes, got {len}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let hash = PasswordHasher::hash("correct-horse-battery").unwrap();
        assert!(PasswordHasher::verify("correct-horse-battery", &hash).unwrap());
        assert!(!PasswordHasher::verify("wrong-password", &hash).unwrap());
    }

    #[test]
    fn rejects_passwords_shorter_than_minimum() {
        assert!(PasswordHasher::hash("short").is_err());
    }

    #[test]
    fn rejects_passwords_longer_than_bcrypt_window() {
        let too_long = "a".repeat(73);
        assert!(PasswordHasher::hash(&too_long).is_err());
    }
}
