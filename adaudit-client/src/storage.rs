//! Direct object storage client
//!
//! Uploads go straight to the presigned URL, bypassing the backend: the
//! backend never observes this step, so a successful PUT proves nothing
//! about backend state.

use adaudit_common::config::Settings;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Object storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upload rejected with status {0}: {1}")]
    Status(u16, String),
}

/// Client for presigned-URL uploads and public read URLs
pub struct StorageClient {
    http_client: reqwest::Client,
    public_base_url: String,
}

impl StorageClient {
    pub fn new(settings: &Settings) -> Result<Self, StorageError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| StorageError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            public_base_url: settings.storage_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// PUT a binary payload to a presigned upload URL
    ///
    /// The Content-Type header must match the one the credential was issued
    /// for, or the storage service rejects the signature.
    pub async fn put_object(
        &self,
        upload_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!(bytes = body.len(), content_type, "Uploading creative");

        let response = self
            .http_client
            .put(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StorageError::Status(status.as_u16(), error_text));
        }

        info!("Creative uploaded to object storage");
        Ok(())
    }

    /// Public read URL for an uploaded asset
    pub fn public_url(&self, s3_key: &str) -> String {
        format!("{}/{}", self.public_base_url, s3_key.trim_start_matches('/'))
    }
}
