//! Domain types for the backoffice service.

pub mod account;

pub use account::{Account, AccountDocument, NewAccount};
