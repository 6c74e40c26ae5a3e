//! Authenticated identity value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::AccountId;
use super::role::Role;

/// An authenticated account, as produced by credential verification.
///
/// Passed explicitly into session issuance and every authorization decision.
/// There is no ambient "current user"; anything that needs the caller's
/// identity takes one of these as an argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Store key of the account document.
    pub id: AccountId,
    /// The account's email address.
    pub email: Email,
    /// Optional display name.
    pub display_name: Option<String>,
    /// Validated role.
    pub role: Role,
    /// Previous successful login, if any.
    pub last_login: Option<DateTime<Utc>>,
}
