//! Password material variants and the new-password strength policy.

use serde::{Deserialize, Serialize};

/// Stored password material for an account.
///
/// Exactly one shape is present per record. Current accounts carry a salted
/// derived key; accounts provisioned before hashing was introduced still hold
/// the raw password and are verified through a deliberately weaker
/// constant-time string comparison until they are migrated. The verifier
/// branches on this tag, never on field presence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PasswordMaterial {
    /// PBKDF2-derived key plus its salt, both base64 text.
    Hashed {
        /// Base64 of the 16-byte random salt.
        salt: String,
        /// Base64 of the 32-byte derived key.
        derived_key: String,
    },
    /// Raw password from a pre-hashing account. Weak by design; kept only
    /// for un-migrated records.
    LegacyPlaintext {
        /// The stored raw password.
        value: String,
    },
}

impl PasswordMaterial {
    /// Whether this record still carries a raw legacy password.
    #[must_use]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::LegacyPlaintext { .. })
    }
}

/// Errors from the new-password strength policy.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters")]
    TooShort {
        /// Minimum required length.
        min: usize,
    },
    #[error("password must contain an uppercase letter")]
    MissingUppercase,
    #[error("password must contain a lowercase letter")]
    MissingLowercase,
    #[error("password must contain a digit")]
    MissingDigit,
}

/// Minimum length for a newly chosen password.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a newly chosen password against the strength policy.
///
/// Applies to the setup flow and self-registration; stored legacy passwords
/// are exempt.
///
/// # Errors
///
/// Returns the first policy rule the password fails.
pub fn validate_password_strength(password: &str) -> Result<(), PasswordPolicyError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if !password.chars().any(char::is_uppercase) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !password.chars().any(char::is_lowercase) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_compliant_password() {
        assert!(validate_password_strength("Correct1horse").is_ok());
        assert!(validate_password_strength("Aa345678").is_ok());
    }

    #[test]
    fn test_rejects_short_password() {
        assert_eq!(
            validate_password_strength("Aa1"),
            Err(PasswordPolicyError::TooShort { min: 8 })
        );
    }

    #[test]
    fn test_rejects_missing_character_classes() {
        assert_eq!(
            validate_password_strength("lowercase1"),
            Err(PasswordPolicyError::MissingUppercase)
        );
        assert_eq!(
            validate_password_strength("UPPERCASE1"),
            Err(PasswordPolicyError::MissingLowercase)
        );
        assert_eq!(
            validate_password_strength("NoDigitsHere"),
            Err(PasswordPolicyError::MissingDigit)
        );
    }

    #[test]
    fn test_legacy_tag() {
        let legacy = PasswordMaterial::LegacyPlaintext {
            value: "hunter2".to_owned(),
        };
        assert!(legacy.is_legacy());

        let hashed = PasswordMaterial::Hashed {
            salt: "c2FsdA==".to_owned(),
            derived_key: "a2V5".to_owned(),
        };
        assert!(!hashed.is_legacy());
    }
}
