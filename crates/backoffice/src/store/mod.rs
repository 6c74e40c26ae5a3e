//! Access layer for the external account document store.
//!
//! The store itself is an external collaborator exposing keyed-document
//! primitives: get by id, set with merge, partial update, and
//! query-by-field-equality. Everything in this module goes through the
//! [`DocumentStore`] trait so handlers and services never care which backend
//! is wired in:
//!
//! - [`rest::RestDocumentStore`] - HTTP client against the store gateway
//! - [`memory::MemoryStore`] - in-process backend for tests and local runs
//!
//! Typed access to the `accounts` collection lives in
//! [`accounts::AccountRepository`].

pub mod accounts;
pub mod memory;
pub mod rest;

use async_trait::async_trait;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use memory::MemoryStore;
pub use rest::RestDocumentStore;

/// Field map of a stored document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store is unreachable or the service was started without valid
    /// store credentials. Retryable; callers surface a generic
    /// service-unavailable message.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the request.
    #[error("store error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// Write-time uniqueness violation (e.g. duplicate account email).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored document does not match the expected shape.
    #[error("data corruption: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            return Self::Unavailable(err.to_string());
        }
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Api {
            status: err.status().map_or(0, |s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Keyed-document store primitives.
///
/// Implementations must be cheap to share behind an `Arc`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id. `Ok(None)` when the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>, StoreError>;

    /// Write the given fields, creating the document if absent and merging
    /// field-by-field if present. A `null` value clears the field.
    async fn set_merge(&self, collection: &str, id: &str, fields: Fields)
    -> Result<(), StoreError>;

    /// Partially update an existing document.
    ///
    /// Unlike [`DocumentStore::set_merge`], fails with
    /// [`StoreError::NotFound`] when the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// All documents whose `field` equals `value`, in store order.
    ///
    /// Returns `(document id, fields)` pairs; zero or more matches.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<(String, Fields)>, StoreError>;
}
