//! Typed access to the `accounts` collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use coopworks_core::{AccountId, Email};

use crate::models::{Account, AccountDocument, NewAccount};

use super::{DocumentStore, Fields, StoreError};

/// Name of the accounts collection in the store.
const COLLECTION: &str = "accounts";

/// Repository for account document operations.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn DocumentStore>,
}

impl AccountRepository {
    /// Create a new account repository over a store backend.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn decode(id: String, fields: Fields) -> Result<Account, StoreError> {
        let document: AccountDocument = serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| StoreError::Decode(format!("malformed account document {id}: {e}")))?;
        document.into_account(AccountId::from_raw(id))
    }

    fn encode(document: &AccountDocument) -> Result<Fields, StoreError> {
        match serde_json::to_value(document) {
            Ok(serde_json::Value::Object(fields)) => Ok(fields),
            Ok(_) | Err(_) => Err(StoreError::Decode(
                "account document did not serialize to an object".to_owned(),
            )),
        }
    }

    /// Find the account whose email equals the given address.
    ///
    /// Emails are compared in normalized (lowercased) form. Uniqueness is
    /// enforced at creation time, but pre-existing duplicates may remain in
    /// the collection; the first match in store order wins and the
    /// duplication is logged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails or the winning document is
    /// malformed.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        let hits = self
            .store
            .query_eq(COLLECTION, "email", &json!(email.normalized()))
            .await?;

        if hits.len() > 1 {
            tracing::warn!(
                email = %email.normalized(),
                matches = hits.len(),
                "duplicate account email in store; using first match"
            );
        }

        hits.into_iter()
            .next()
            .map(|(id, fields)| Self::decode(id, fields))
            .transpose()
    }

    /// Fetch an account by its store key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the fetch fails or the document is
    /// malformed.
    pub async fn get_by_id(&self, id: &AccountId) -> Result<Option<Account>, StoreError> {
        let fields = self.store.get(COLLECTION, id.as_str()).await?;
        fields
            .map(|fields| Self::decode(id.as_str().to_owned(), fields))
            .transpose()
    }

    /// Create a new account document.
    ///
    /// The document key is derived from the normalized email, and an
    /// existing document under that key fails the write with
    /// [`StoreError::Conflict`] rather than being merged over.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] on duplicate email, or any
    /// [`StoreError`] from the underlying writes.
    pub async fn create(&self, new_account: NewAccount) -> Result<Account, StoreError> {
        let id = AccountId::for_email(&new_account.email);

        if self.store.get(COLLECTION, id.as_str()).await?.is_some() {
            return Err(StoreError::Conflict(
                "an account with this email already exists".to_owned(),
            ));
        }

        let document = new_account.into_document(Utc::now());
        let fields = Self::encode(&document)?;
        self.store.set_merge(COLLECTION, id.as_str(), fields).await?;

        document.into_account(id)
    }

    /// Record a successful login time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the partial update fails. Callers treat
    /// this as best-effort; a failure never invalidates the login itself.
    pub async fn record_login(
        &self,
        id: &AccountId,
        when: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut fields = Fields::new();
        fields.insert("lastLogin".to_owned(), json!(when));
        self.store.update(COLLECTION, id.as_str(), fields).await
    }

    /// Persist newly derived password material and mark setup complete.
    ///
    /// Clears any legacy raw password in the same write so the record ends
    /// up with exactly one material shape.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the merge write fails.
    pub async fn set_password(
        &self,
        id: &AccountId,
        salt_b64: &str,
        derived_key_b64: &str,
    ) -> Result<(), StoreError> {
        let mut fields = Fields::new();
        fields.insert("passwordSalt".to_owned(), json!(salt_b64));
        fields.insert("passwordHash".to_owned(), json!(derived_key_b64));
        fields.insert("isPasswordSet".to_owned(), json!(true));
        fields.insert("password".to_owned(), serde_json::Value::Null);
        self.store.set_merge(COLLECTION, id.as_str(), fields).await
    }
}
