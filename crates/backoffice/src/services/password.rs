//! Password hashing service.
//!
//! PBKDF2-HMAC-SHA256 with a 16-byte random salt, 100k rounds and a 32-byte
//! derived key; salt and key travel as base64 text. Comparison uses
//! `subtle`'s constant-time equality: unequal lengths are rejected up front,
//! equal-length comparison never short-circuits on a prefix mismatch.
//!
//! Derivation is CPU-bound, so the async entry points run it on the blocking
//! pool; a login that is abandoned mid-hash simply drops the handle.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// PBKDF2 iteration count.
const ROUNDS: u32 = 100_000;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Errors that can occur while hashing or verifying passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// Stored salt or key is not valid base64.
    #[error("corrupt stored password material: {0}")]
    Corrupt(String),

    /// The blocking derivation task failed to complete.
    #[error("key derivation task failed: {0}")]
    Task(String),
}

/// Freshly derived password material, base64-encoded for storage.
#[derive(Debug, Clone)]
pub struct DerivedPassword {
    /// Base64 of the random salt.
    pub salt: String,
    /// Base64 of the derived key.
    pub derived_key: String,
}

/// Generate a fresh random salt.
#[must_use]
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    let mut salt = [0u8; SALT_LENGTH];
    rand::rng().fill_bytes(&mut salt);
    salt
}

fn derive_key_sync(password: &str, salt: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ROUNDS, &mut key);
    key
}

/// Derive the key for a password and salt on the blocking pool.
///
/// # Errors
///
/// Returns [`PasswordError::Task`] if the blocking task is cancelled or
/// panics.
pub async fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; KEY_LENGTH], PasswordError> {
    let password = password.to_owned();
    let salt = salt.to_vec();
    tokio::task::spawn_blocking(move || derive_key_sync(&password, &salt))
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))
}

/// Hash a new password with a fresh salt.
///
/// # Errors
///
/// Returns [`PasswordError::Task`] if the blocking task fails.
pub async fn hash_password(password: &str) -> Result<DerivedPassword, PasswordError> {
    let salt = generate_salt();
    let key = derive_key(password, &salt).await?;
    Ok(DerivedPassword {
        salt: STANDARD.encode(salt),
        derived_key: STANDARD.encode(key),
    })
}

/// Verify a password against stored hashed material.
///
/// Re-derives with the stored salt and compares in constant time.
///
/// # Errors
///
/// Returns [`PasswordError::Corrupt`] if the stored salt or key is not
/// valid base64, or [`PasswordError::Task`] if derivation fails.
pub async fn verify(
    password: &str,
    stored_key_b64: &str,
    stored_salt_b64: &str,
) -> Result<bool, PasswordError> {
    let stored_key = STANDARD
        .decode(stored_key_b64)
        .map_err(|e| PasswordError::Corrupt(format!("derived key: {e}")))?;
    let salt = STANDARD
        .decode(stored_salt_b64)
        .map_err(|e| PasswordError::Corrupt(format!("salt: {e}")))?;

    let derived = derive_key(password, &salt).await?;
    Ok(bool::from(derived.as_slice().ct_eq(&stored_key)))
}

/// Verify a password against a stored legacy raw password.
///
/// Constant-time string comparison; length mismatch is rejected up front,
/// never mid-loop. This is the deliberately weaker fallback for accounts
/// created before hashing was introduced - do not extend its use.
#[must_use]
pub fn verify_legacy(password: &str, stored: &str) -> bool {
    bool::from(password.as_bytes().ct_eq(stored.as_bytes()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roundtrip_verifies() {
        let hashed = hash_password("Correct1horse").await.unwrap();
        assert!(
            verify("Correct1horse", &hashed.derived_key, &hashed.salt)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_any_single_byte_change_fails() {
        let password = "Correct1horse";
        let hashed = hash_password(password).await.unwrap();

        for i in 0..password.len() {
            let mut mutated = password.as_bytes().to_vec();
            mutated[i] ^= 0x01;
            let mutated = String::from_utf8(mutated).unwrap();
            assert!(
                !verify(&mutated, &hashed.derived_key, &hashed.salt)
                    .await
                    .unwrap(),
                "mutation at byte {i} unexpectedly verified"
            );
        }
    }

    #[tokio::test]
    async fn test_derived_key_is_32_bytes_for_any_input_length() {
        for password in ["", "x", "a-much-longer-password-than-the-key-itself-0123456789"] {
            let key = derive_key(password, b"0123456789abcdef").await.unwrap();
            assert_eq!(key.len(), KEY_LENGTH);

            let hashed = hash_password(password).await.unwrap();
            let raw = base64::engine::general_purpose::STANDARD
                .decode(hashed.derived_key)
                .unwrap();
            assert_eq!(raw.len(), KEY_LENGTH);
        }
    }

    #[tokio::test]
    async fn test_fresh_salts_differ() {
        let a = hash_password("Same1password").await.unwrap();
        let b = hash_password("Same1password").await.unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.derived_key, b.derived_key);
    }

    #[tokio::test]
    async fn test_corrupt_base64_is_an_error() {
        let err = verify("pw", "!!not-base64!!", "c2FsdA==").await.unwrap_err();
        assert!(matches!(err, PasswordError::Corrupt(_)));
    }

    #[test]
    fn test_legacy_compare() {
        assert!(verify_legacy("hunter2", "hunter2"));
        assert!(!verify_legacy("hunter2", "hunter3"));
        assert!(!verify_legacy("hunter2", "hunter22"));
        assert!(!verify_legacy("", "hunter2"));
        assert!(verify_legacy("", ""));
    }

    #[test]
    fn test_salt_length() {
        assert_eq!(generate_salt().len(), SALT_LENGTH);
    }
}
