//! HTTP client for the remote receipt store.
//!
//! Transport only: timeout/retry policy and session handling belong to the
//! surrounding deployment, not to this client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::error::ApiError;

use super::types::{ReceiptPatch, RemoteReceipt};

/// The remote receipt store, as consumed by the orchestrator.
#[async_trait]
pub trait ReceiptApi: Send + Sync {
    /// Upload raw document bytes; the server parses and echoes its
    /// canonical record.
    async fn upload_receipt(&self, raw: &[u8]) -> Result<RemoteReceipt, ApiError>;

    /// Fetch the full remote receipt list.
    async fn list_receipts(&self) -> Result<Vec<RemoteReceipt>, ApiError>;

    /// Push field updates for the receipt with the given business key.
    async fn update_receipt(
        &self,
        key: &str,
        patch: &ReceiptPatch,
    ) -> Result<RemoteReceipt, ApiError>;

    /// Delete the receipt with the given business key.
    async fn delete_receipt(&self, key: &str) -> Result<(), ApiError>;
}

/// reqwest-backed implementation of [`ReceiptApi`].
#[derive(Debug, Clone)]
pub struct HttpReceiptApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpReceiptApi {
    /// Create a client for the given base URL.
    ///
    /// The API key, when provided, is sent as an `x-api-key` header on
    /// every request.
    pub fn new(base_url: impl Into<String>, api_key: Option<&str>) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert("accept", HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::Config(format!("invalid API key header value: {e}")))?;
            value.set_sensitive(true);
            headers.insert("x-api-key", value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ReceiptApi for HttpReceiptApi {
    async fn upload_receipt(&self, raw: &[u8]) -> Result<RemoteReceipt, ApiError> {
        debug!("Uploading {} document bytes", raw.len());
        let response = self
            .client
            .post(self.url("/receipts"))
            .header("content-type", "application/octet-stream")
            .body(raw.to_vec())
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn list_receipts(&self) -> Result<Vec<RemoteReceipt>, ApiError> {
        let response = self.client.get(self.url("/receipts")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn update_receipt(
        &self,
        key: &str,
        patch: &ReceiptPatch,
    ) -> Result<RemoteReceipt, ApiError> {
        debug!(key, "Pushing receipt update");
        let response = self
            .client
            .patch(self.url(&format!("/receipts/{key}")))
            .json(patch)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_receipt(&self, key: &str) -> Result<(), ApiError> {
        debug!(key, "Deleting remote receipt");
        let response = self
            .client
            .delete(self.url(&format!("/receipts/{key}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
