//! Business logic services.

pub mod auth;
pub mod password;

pub use auth::{AuthError, AuthService};
