//! Account identifier type.
//!
//! Account documents are keyed deterministically by the normalized email
//! address, so the same address always maps to the same document and lookups
//! never need a secondary index.

use core::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use super::email::Email;

/// Identifier of an account document in the store.
///
/// Derived from the normalized (lowercased, trimmed) email via URL-safe
/// base64 without padding, which keeps the key free of characters the store
/// treats specially (`/`, `+`, `=`).
///
/// ```
/// use coopworks_core::{AccountId, Email};
///
/// let a = AccountId::for_email(&Email::parse("Member@Coop.Example").unwrap());
/// let b = AccountId::for_email(&Email::parse("member@coop.example").unwrap());
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Derive the account ID for an email address.
    #[must_use]
    pub fn for_email(email: &Email) -> Self {
        Self(URL_SAFE_NO_PAD.encode(email.normalized().as_bytes()))
    }

    /// Wrap a raw document key read back from the store.
    #[must_use]
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the ID and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
