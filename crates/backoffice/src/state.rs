//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::{BackofficeConfig, StoreBackendConfig};
use crate::store::{AccountRepository, DocumentStore, MemoryStore, RestDocumentStore, StoreError};

/// Application state shared across all handlers.
///
/// Cheap to clone; everything lives behind one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BackofficeConfig,
    accounts: Option<AccountRepository>,
}

impl AppState {
    /// Build state from configuration, wiring the configured store backend.
    ///
    /// A missing store configuration is a degraded but valid state: pages
    /// still serve and account endpoints answer 503.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the REST store client cannot be constructed
    /// from the configured credentials.
    pub fn new(config: BackofficeConfig) -> Result<Self, StoreError> {
        let accounts = match &config.store {
            Some(StoreBackendConfig::Memory) => {
                tracing::info!("using in-memory account store");
                let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
                Some(AccountRepository::new(store))
            }
            Some(StoreBackendConfig::Rest(rest)) => {
                let store: Arc<dyn DocumentStore> = Arc::new(RestDocumentStore::new(rest)?);
                Some(AccountRepository::new(store))
            }
            None => {
                tracing::warn!(
                    "account store not configured; account operations will be unavailable"
                );
                None
            }
        };

        Ok(Self {
            inner: Arc::new(AppStateInner { config, accounts }),
        })
    }

    /// Build state around an existing store. Used by integration tests.
    #[must_use]
    pub fn with_store(config: BackofficeConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                accounts: Some(AccountRepository::new(store)),
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BackofficeConfig {
        &self.inner.config
    }

    /// The account repository, if a store backend is configured.
    #[must_use]
    pub fn accounts(&self) -> Option<&AccountRepository> {
        self.inner.accounts.as_ref()
    }
}
