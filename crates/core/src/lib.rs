//! CoopWorks Core - Shared types library.
//!
//! This crate provides common types used across all CoopWorks components:
//! - `backoffice` - Member, loan and savings administration service
//! - `integration-tests` - End-to-end tests against the backoffice router
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no store
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Emails, account IDs, the role enumeration, password material

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
