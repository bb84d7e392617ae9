//! Password hashing using argon2
//!
//! Plaintext passwords only ever travel inside `SecretString`, so they are
//! redacted from `Debug` output and zeroed on drop.
//!
//! # Performance Considerations
//!
//! Argon2 is intentionally CPU-intensive. The async variants move the work
//! onto the blocking thread pool.

use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, SecretString};

/// Password hashing service
///
/// Uses Argon2id with a random salt per hash.
pub struct PasswordService;

impl PasswordService {
    /// Hash a password (blocking operation)
    pub fn hash(password: &SecretString) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
        Ok(hash.to_string())
    }

    /// Hash a password without blocking the async runtime
    pub async fn hash_async(password: SecretString) -> Result<String> {
        tokio::task::spawn_blocking(move || Self::hash(&password))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }

    /// Verify a password against a stored hash (blocking operation)
    ///
    /// A malformed stored hash is an error, a mismatch is `Ok(false)`.
    pub fn verify(password: &SecretString, hash: &str) -> Result<bool> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid hash format: {}", e))?;
        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Verify a password without blocking the async runtime
    pub async fn verify_async(password: SecretString, hash: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::verify(&password, &hash))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash(&secret("correctpw")).unwrap();

        assert!(PasswordService::verify(&secret("correctpw"), &hash).unwrap());
        assert!(!PasswordService::verify(&secret("wrongpw"), &hash).unwrap());
    }

    #[test]
    fn test_hash_is_salted() {
        let hash1 = PasswordService::hash(&secret("same_password")).unwrap();
        let hash2 = PasswordService::hash(&secret("same_password")).unwrap();

        assert_ne!(hash1, hash2);
        assert!(!hash1.contains("same_password"));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(PasswordService::verify(&secret("anything"), "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_async_hash_and_verify() {
        let hash = PasswordService::hash_async(secret("async_password"))
            .await
            .unwrap();

        assert!(PasswordService::verify_async(secret("async_password"), hash.clone())
            .await
            .unwrap());
        assert!(!PasswordService::verify_async(secret("wrong"), hash)
            .await
            .unwrap());
    }
}
