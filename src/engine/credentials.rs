use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::{Error, Result};

/// Hashes a password with Argon2id and a fresh random salt.
///
/// The returned string is the PHC format produced by the `password_hash`
/// API and is what gets persisted in the user record.
pub fn hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(e.to_string()))?;
    Ok(hashed.to_string())
}

/// Verifies a password against a stored hash.
///
/// A malformed stored hash verifies as `false` rather than erroring, so a
/// damaged record can never be logged into.
pub fn verify(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verify_roundtrip() {
        let hashed = hash("topsecret").unwrap();
        assert_ne!(hashed, "topsecret");
        assert!(verify("topsecret", &hashed));
    }

    #[test]
    fn test_verify_with_wrong_password() {
        let hashed = hash("topsecret").unwrap();
        assert!(!verify("nottheone", &hashed));
    }

    #[test]
    fn test_verify_with_garbage_hash() {
        assert!(!verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash("topsecret").unwrap(), hash("topsecret").unwrap());
    }
}
