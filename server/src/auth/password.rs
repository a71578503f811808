//! Password Hashing
//!
//! Argon2id with a random salt per password, stored as a PHC string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::error::{AuthError, AuthResult};

/// Hash a password for storage.
pub fn hash_password(password: &str) -> AuthResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to hash password");
            AuthError::PasswordHash
        })
}

/// Check a password against a stored hash.
///
/// A mismatch is `Ok(false)`; a malformed stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> AuthResult<bool> {
    let parsed = PasswordHash::new(password_hash).map_err(|e| {
        tracing::error!(error = %e, "Stored password hash is malformed");
        AuthError::PasswordHash
    })?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => {
            tracing::error!(error = %e, "Password verification failed");
            Err(AuthError::PasswordHash)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}
