//! Request middleware and extractors.

pub mod guard;

pub use guard::{CurrentSession, RequireAdministrative, RequireSession, authorize_navigation};
