//! Account record types and their store document shape.
//!
//! The store keeps accounts as loosely-typed documents with optional fields;
//! this module is the only place that knows the wire shape. Everything past
//! the conversion boundary works with the validated [`Account`] domain type,
//! and password material is an explicit tagged variant rather than a pair of
//! maybe-present fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coopworks_core::{AccountId, Email, PasswordMaterial, Role};

use crate::store::StoreError;

/// A member or staff account (domain type).
#[derive(Debug, Clone)]
pub struct Account {
    /// Store key, derived from the normalized email.
    pub id: AccountId,
    /// The account's email address.
    pub email: Email,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Role as stored - free text, validated against the enumeration at
    /// verification time so a bad value fails that login rather than
    /// poisoning every read of the record.
    pub role_text: Option<String>,
    /// Password material, if any has been established.
    pub password: Option<PasswordMaterial>,
    /// Whether the one-time password setup has completed.
    pub password_set: bool,
    /// When the account was created.
    pub created_at: Option<DateTime<Utc>>,
    /// Previous successful login.
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// The stored role, if it parses to a known role.
    #[must_use]
    pub fn parsed_role(&self) -> Option<Role> {
        self.role_text
            .as_deref()
            .and_then(|text| Role::parse(text).ok())
    }
}

/// Raw document shape of an account in the store.
///
/// Field names are camelCase on the wire. `password` is the legacy raw
/// password of pre-hashing accounts; `passwordHash`/`passwordSalt` carry the
/// current derived-key material. At most one of the two shapes is expected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDocument {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_salt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub is_password_set: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

impl AccountDocument {
    /// Interpret the optional password fields as tagged material.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when a hash is present without its
    /// salt (or vice versa).
    fn password_material(&self) -> Result<Option<PasswordMaterial>, StoreError> {
        match (&self.password_hash, &self.password_salt) {
            (Some(hash), Some(salt)) => Ok(Some(PasswordMaterial::Hashed {
                salt: salt.clone(),
                derived_key: hash.clone(),
            })),
            (None, None) => Ok(self.password.clone().map(|value| {
                PasswordMaterial::LegacyPlaintext { value }
            })),
            _ => Err(StoreError::Decode(
                "account has a password hash without a salt".to_owned(),
            )),
        }
    }

    /// Convert into the domain type, attaching the document's store key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] when the email or password fields do
    /// not form a valid record.
    pub fn into_account(self, id: AccountId) -> Result<Account, StoreError> {
        let password = self.password_material()?;
        let email = Email::parse(&self.email)
            .map_err(|e| StoreError::Decode(format!("invalid email in store: {e}")))?;

        Ok(Account {
            id,
            email,
            display_name: self.name,
            role_text: self.role,
            password,
            password_set: self.is_password_set,
            created_at: self.created_at,
            last_login: self.last_login,
        })
    }
}

/// Input for creating an account document.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub display_name: Option<String>,
    pub role: Role,
    /// Hashed material for self-registered accounts; `None` for
    /// administrator-provisioned accounts, which complete the setup flow
    /// later.
    pub password: Option<(String, String)>, // (salt_b64, derived_key_b64)
}

impl NewAccount {
    /// Build the document for this account.
    #[must_use]
    pub fn into_document(self, now: DateTime<Utc>) -> AccountDocument {
        let password_set = self.password.is_some();
        let (password_salt, password_hash) = match self.password {
            Some((salt, key)) => (Some(salt), Some(key)),
            None => (None, None),
        };

        AccountDocument {
            email: self.email.normalized(),
            name: self.display_name,
            role: Some(self.role.as_str().to_owned()),
            password_hash,
            password_salt,
            password: None,
            is_password_set: password_set,
            created_at: Some(now),
            last_login: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn base_document() -> AccountDocument {
        AccountDocument {
            email: "member@coop.example".to_owned(),
            name: Some("Member One".to_owned()),
            role: Some("member".to_owned()),
            password_hash: None,
            password_salt: None,
            password: None,
            is_password_set: false,
            created_at: None,
            last_login: None,
        }
    }

    #[test]
    fn test_hashed_material_wins() {
        let mut doc = base_document();
        doc.password_hash = Some("aGFzaA==".to_owned());
        doc.password_salt = Some("c2FsdA==".to_owned());

        let account = doc.into_account(AccountId::from_raw("id1")).unwrap();
        assert!(matches!(
            account.password,
            Some(PasswordMaterial::Hashed { .. })
        ));
    }

    #[test]
    fn test_legacy_material_from_bare_password() {
        let mut doc = base_document();
        doc.password = Some("hunter2".to_owned());

        let account = doc.into_account(AccountId::from_raw("id1")).unwrap();
        assert_eq!(
            account.password,
            Some(PasswordMaterial::LegacyPlaintext {
                value: "hunter2".to_owned()
            })
        );
    }

    #[test]
    fn test_hash_without_salt_is_corrupt() {
        let mut doc = base_document();
        doc.password_hash = Some("aGFzaA==".to_owned());

        let err = doc.into_account(AccountId::from_raw("id1")).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn test_invalid_email_is_corrupt() {
        let mut doc = base_document();
        doc.email = "not-an-email".to_owned();

        let err = doc.into_account(AccountId::from_raw("id1")).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[test]
    fn test_document_wire_field_names() {
        let mut doc = base_document();
        doc.password_hash = Some("h".to_owned());
        doc.password_salt = Some("s".to_owned());
        doc.is_password_set = true;

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("passwordHash").is_some());
        assert!(value.get("passwordSalt").is_some());
        assert!(value.get("isPasswordSet").is_some());
        assert!(value.get("password_hash").is_none());
    }

    #[test]
    fn test_new_account_without_password_defers_setup() {
        let email = Email::parse("driver@coop.example").unwrap();
        let doc = NewAccount {
            email,
            display_name: None,
            role: Role::Driver,
            password: None,
        }
        .into_document(Utc::now());

        assert!(!doc.is_password_set);
        assert!(doc.password_hash.is_none());
        assert_eq!(doc.role.as_deref(), Some("driver"));
    }
}
