//! HTTP client for the document-store gateway.
//!
//! The gateway exposes the keyed-document primitives over JSON:
//!
//! - `GET /v1/{collection}/{id}` - fetch one document
//! - `PUT /v1/{collection}/{id}?merge=true` - set with field-wise merge
//! - `PATCH /v1/{collection}/{id}` - partial update, 404 when absent
//! - `POST /v1/{collection}:query` - field-equality query
//!
//! Authentication: bearer API key. Invalid credentials surface as
//! [`StoreError::Unavailable`] so callers degrade to a retryable
//! service-unavailable response instead of crashing.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::config::StoreRestConfig;

use super::{DocumentStore, Fields, StoreError};
use async_trait::async_trait;

/// Request timeout for store round trips.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Document store client over the gateway HTTP API.
pub struct RestDocumentStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct DocumentBody {
    fields: Fields,
}

#[derive(Debug, Serialize)]
struct WriteBody<'a> {
    fields: &'a Fields,
}

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    field: &'a str,
    op: &'static str,
    value: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    documents: Vec<QueryHit>,
}

#[derive(Debug, Deserialize)]
struct QueryHit {
    id: String,
    fields: Fields,
}

impl RestDocumentStore {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the API key is not a valid
    /// header value or the HTTP client fails to build.
    pub fn new(config: &StoreRestConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StoreError::Unavailable(format!("invalid store API key: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/v1/{collection}/{id}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unavailable(
                "store rejected the configured credentials".to_owned(),
            )),
            s if s.is_server_error() => Err(StoreError::Unavailable(format!("{s}: {message}"))),
            s => Err(StoreError::Api {
                status: s.as_u16(),
                message,
            }),
        }
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Fields>, StoreError> {
        let response = self
            .client
            .get(self.document_url(collection, id))
            .send()
            .await?;

        match Self::check(response).await {
            Ok(response) => {
                let body: DocumentBody = response.json().await?;
                Ok(Some(body.fields))
            }
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_merge(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.document_url(collection, id))
            .query(&[("merge", "true")])
            .json(&WriteBody { fields: &fields })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let response = self
            .client
            .patch(self.document_url(collection, id))
            .json(&WriteBody { fields: &fields })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &serde_json::Value,
    ) -> Result<Vec<(String, Fields)>, StoreError> {
        let url = format!("{}/v1/{collection}:query", self.base_url);
        let response = self
            .client
            .post(url)
            .json(&QueryBody {
                field,
                op: "==",
                value,
            })
            .send()
            .await?;

        let body: QueryResponse = Self::check(response).await?.json().await?;
        Ok(body
            .documents
            .into_iter()
            .map(|hit| (hit.id, hit.fields))
            .collect())
    }
}
