//! Credential verification, password setup and account provisioning.
//!
//! The verifier is the single entry point for logins: it looks up the
//! account, checks the password against whichever material shape is present,
//! validates the role against the closed enumeration, and hands back a typed
//! [`Identity`]. Every failure path is an [`AuthError`] variant; nothing
//! here throws across the boundary.

mod error;

pub use error::AuthError;

use chrono::Utc;

use coopworks_core::{
    Email, Identity, PasswordMaterial, Role, RoleParseError, validate_password_strength,
};

use crate::models::NewAccount;
use crate::services::password;
use crate::store::AccountRepository;

/// Authentication service over the accounts collection.
///
/// Constructed per request; holds no state beyond the repository handle.
pub struct AuthService<'a> {
    accounts: &'a AccountRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a AccountRepository) -> Self {
        Self { accounts }
    }

    /// Verify a login attempt.
    ///
    /// Each call is a single sequential verify-then-respond unit; the only
    /// suspension points are the store round trip and the key derivation.
    /// No cross-request locking is taken on the account record.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] variant describing why the attempt was
    /// rejected; see the variant docs for which are retryable.
    pub async fn verify_credentials(
        &self,
        email_text: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let email =
            Email::parse(email_text).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        // Provisioned-but-unset accounts short-circuit before any password
        // work, regardless of what was supplied. The caller routes into the
        // setup flow.
        if !account.password_set {
            return Err(AuthError::PasswordNotSet);
        }

        let matches = match &account.password {
            Some(PasswordMaterial::Hashed { salt, derived_key }) => {
                password::verify(password, derived_key, salt).await?
            }
            Some(PasswordMaterial::LegacyPlaintext { value }) => {
                tracing::warn!(
                    account = %account.id,
                    "login via un-migrated legacy plaintext password"
                );
                password::verify_legacy(password, value)
            }
            // Marked set but carrying no material: fail closed.
            None => false,
        };
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let role = match Role::parse(account.role_text.as_deref().unwrap_or("")) {
            Ok(role) => role,
            Err(RoleParseError::Missing) => return Err(AuthError::RoleMissing),
            Err(RoleParseError::Unknown(text)) => return Err(AuthError::RoleInvalid(text)),
        };

        // Best effort: a failed timestamp write must not invalidate the login.
        let now = Utc::now();
        if let Err(e) = self.accounts.record_login(&account.id, now).await {
            tracing::warn!(account = %account.id, error = %e, "failed to record last login");
        }

        Ok(Identity {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            role,
            last_login: Some(now),
        })
    }

    /// Complete one-time password setup for a provisioned account.
    ///
    /// # Errors
    ///
    /// - [`AuthError::AccountNotFound`] - no account for the email
    /// - [`AuthError::AlreadySet`] - setup already completed; never
    ///   silently overwrites
    /// - [`AuthError::InvalidInput`] - password fails the strength policy
    /// - [`AuthError::ServiceUnavailable`] - store or hashing failure
    pub async fn setup_password(
        &self,
        email_text: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email =
            Email::parse(email_text).map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.password_set {
            return Err(AuthError::AlreadySet);
        }

        validate_password_strength(new_password)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let derived = password::hash_password(new_password).await?;
        self.accounts
            .set_password(&account.id, &derived.salt, &derived.derived_key)
            .await?;

        tracing::info!(account = %account.id, "password setup completed");
        Ok(())
    }

    /// Self-registration. Restricted to the administrative subset by design;
    /// members are enrolled through the provisioning flow.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidInput`] for bad email/role/password,
    /// [`AuthError::EmailTaken`] on duplicates, or
    /// [`AuthError::ServiceUnavailable`] on store failure.
    pub async fn register(
        &self,
        email_text: &str,
        display_name: Option<String>,
        role_text: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let email =
            Email::parse(email_text).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let role = Role::parse(role_text)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        if !role.is_administrative() {
            return Err(AuthError::InvalidInput(
                "self-registration is limited to administrative roles".to_owned(),
            ));
        }
        validate_password_strength(password)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let derived = password::hash_password(password).await?;
        let account = self
            .accounts
            .create(NewAccount {
                email,
                display_name,
                role,
                password: Some((derived.salt, derived.derived_key)),
            })
            .await?;

        tracing::info!(account = %account.id, role = %role, "account registered");
        Ok(Identity {
            id: account.id,
            email: account.email,
            display_name: account.display_name,
            role,
            last_login: None,
        })
    }

    /// Administrator-driven account creation. Any role is allowed; the
    /// password is deferred to the setup flow (`isPasswordSet=false`).
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidInput`] for bad email/role,
    /// [`AuthError::EmailTaken`] on duplicates, or
    /// [`AuthError::ServiceUnavailable`] on store failure.
    pub async fn provision(
        &self,
        email_text: &str,
        display_name: Option<String>,
        role_text: &str,
    ) -> Result<(), AuthError> {
        let email =
            Email::parse(email_text).map_err(|e| AuthError::InvalidInput(e.to_string()))?;
        let role = Role::parse(role_text)
            .map_err(|e| AuthError::InvalidInput(e.to_string()))?;

        let account = self
            .accounts
            .create(NewAccount {
                email,
                display_name,
                role,
                password: None,
            })
            .await?;

        tracing::info!(account = %account.id, role = %role, "account provisioned");
        Ok(())
    }
}
