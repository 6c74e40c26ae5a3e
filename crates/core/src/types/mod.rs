//! Core types for CoopWorks.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod identity;
pub mod password;
pub mod role;

pub use email::{Email, EmailError};
pub use id::AccountId;
pub use identity::Identity;
pub use password::{PasswordMaterial, PasswordPolicyError, validate_password_strength};
pub use role::{Role, RoleParseError, dashboard_path_for};
