//! Authentication outcome type.

use thiserror::Error;

use crate::services::password::PasswordError;
use crate::store::StoreError;

/// Discriminated outcome of credential verification and the setup flow.
///
/// Nothing in the auth service panics or throws across this boundary; every
/// failure path is one of these variants. The HTTP layer decides which
/// variants collapse into a generic message (account enumeration) and which
/// keep a distinct one (role problems need an administrator, not a retry).
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed input (email shape, password policy). Message is safe to
    /// return verbatim.
    #[error("{0}")]
    InvalidInput(String),

    /// No account matches the email.
    #[error("account not found")]
    AccountNotFound,

    /// The account was provisioned by an administrator and has not completed
    /// password setup; the caller must route into the setup flow.
    #[error("password setup required")]
    PasswordNotSet,

    /// Password did not match the stored material.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account record has no role.
    #[error("account has no role assigned")]
    RoleMissing,

    /// The account's role is outside the ten-value enumeration.
    #[error("account role {0:?} is not recognized")]
    RoleInvalid(String),

    /// Password setup was attempted on an account whose password is already
    /// established.
    #[error("password is already set for this account")]
    AlreadySet,

    /// An account with this email already exists.
    #[error("an account with this email already exists")]
    EmailTaken,

    /// The store is unreachable, misconfigured, or returned something
    /// unusable. Retryable; callers show a generic message.
    #[error("service unavailable")]
    ServiceUnavailable,
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::AccountNotFound,
            StoreError::Conflict(_) => Self::EmailTaken,
            StoreError::Unavailable(_) | StoreError::Api { .. } => Self::ServiceUnavailable,
            StoreError::Decode(message) => {
                tracing::error!(error = %message, "corrupt account document");
                Self::ServiceUnavailable
            }
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        tracing::error!(error = %err, "password hashing failure");
        Self::ServiceUnavailable
    }
}
