//! Upload-and-audit submission pipeline
//!
//! Coordinates the 3-step sequence behind "Start Audit":
//! 1. Obtain an upload credential from the backend
//! 2. PUT the creative directly to object storage
//! 3. Trigger server-side AI scoring
//!
//! Steps run strictly in order; step n+1 never starts before step n
//! resolves. No stage retries internally - retry is a full re-invocation
//! by the user. A failure leaves no partial state anywhere: all mutation
//! happens server-side and only after step 3 succeeds.

use crate::api::{ApiError, BackendClient};
use crate::media;
use crate::storage::{StorageClient, StorageError};
use adaudit_common::types::{AuditRecord, UploadCredential, UserId};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Audience text sent when the user leaves the field blank
pub const DEFAULT_TARGET_AUDIENCE: &str = "General audience";

/// Stage-distinct submission errors
///
/// Each variant carries the failing stage's message verbatim so the caller
/// can display it as-is.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No stored session: reported before any network call is made
    #[error("Not logged in")]
    NotAuthenticated,

    /// Stage 1 failed: preparing the upload (credential request)
    #[error("Preparing upload failed: {0}")]
    CredentialRequest(String),

    /// Stage 2 failed: transferring the binary to object storage
    #[error("Upload failed: {0}")]
    UploadTransport(String),

    /// Stage 3 failed: triggering server-side audit processing
    #[error("Audit processing failed: {0}")]
    ProcessingRequest(String),
}

/// Stage 1 seam: issues a single-use upload credential
#[async_trait]
pub trait CredentialIssuer: Send + Sync {
    async fn upload_credential(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadCredential, ApiError>;
}

/// Stage 2 seam: writes the binary to object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put_object(
        &self,
        upload_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Stage 3 seam: invokes the audit-processing endpoint
#[async_trait]
pub trait AuditProcessor: Send + Sync {
    async fn process_audit(
        &self,
        user_id: &UserId,
        s3_key: &str,
        target_audience: &str,
    ) -> Result<AuditRecord, ApiError>;
}

#[async_trait]
impl CredentialIssuer for BackendClient {
    async fn upload_credential(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadCredential, ApiError> {
        BackendClient::upload_credential(self, file_name, content_type).await
    }
}

#[async_trait]
impl AuditProcessor for BackendClient {
    async fn process_audit(
        &self,
        user_id: &UserId,
        s3_key: &str,
        target_audience: &str,
    ) -> Result<AuditRecord, ApiError> {
        BackendClient::process_audit(self, user_id, s3_key, target_audience).await
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn put_object(
        &self,
        upload_url: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        StorageClient::put_object(self, upload_url, body, content_type).await
    }
}

/// Pipeline orchestrator for one audit submission
pub struct SubmitPipeline<'a> {
    issuer: &'a dyn CredentialIssuer,
    store: &'a dyn ObjectStore,
    processor: &'a dyn AuditProcessor,
}

impl<'a> SubmitPipeline<'a> {
    pub fn new(
        issuer: &'a dyn CredentialIssuer,
        store: &'a dyn ObjectStore,
        processor: &'a dyn AuditProcessor,
    ) -> Self {
        Self {
            issuer,
            store,
            processor,
        }
    }

    /// Submit one creative for auditing
    ///
    /// # Arguments
    /// * `image_path` - Local readable image asset
    /// * `target_audience` - Free text; blank falls back to the placeholder
    /// * `user` - Session user id; `None` fails before any network call
    ///
    /// # Returns
    /// * The audit record exactly as the server returned it
    pub async fn submit_audit(
        &self,
        image_path: &Path,
        target_audience: &str,
        user: Option<&UserId>,
    ) -> Result<AuditRecord, SubmitError> {
        // Precondition: a stored, non-empty session id
        let user_id = match user {
            Some(id) if !id.is_empty() => id,
            _ => return Err(SubmitError::NotAuthenticated),
        };

        let file_name = media::upload_file_name(image_path);
        let content_type = media::content_type_for(image_path);

        info!(file = %file_name, content_type, "Starting audit submission");

        // Stage 1: upload credential
        debug!("Stage 1: requesting upload credential");
        let credential = self
            .issuer
            .upload_credential(&file_name, content_type)
            .await
            .map_err(|e| SubmitError::CredentialRequest(e.to_string()))?;

        // Stage 2: direct PUT to object storage. Reading the asset belongs
        // to this stage: an unreadable file is an upload failure.
        debug!(s3_key = %credential.s3_key, "Stage 2: uploading binary");
        let body = tokio::fs::read(image_path)
            .await
            .map_err(|e| SubmitError::UploadTransport(e.to_string()))?;
        self.store
            .put_object(&credential.upload_url, body, content_type)
            .await
            .map_err(|e| SubmitError::UploadTransport(e.to_string()))?;

        // Stage 3: trigger processing
        let audience = if target_audience.trim().is_empty() {
            DEFAULT_TARGET_AUDIENCE
        } else {
            target_audience
        };
        debug!(audience, "Stage 3: triggering audit processing");
        let record = self
            .processor
            .process_audit(user_id, &credential.s3_key, audience)
            .await
            .map_err(|e| SubmitError::ProcessingRequest(e.to_string()))?;

        info!(audit_id = %record.id, "Audit submission complete");
        Ok(record)
    }
}
