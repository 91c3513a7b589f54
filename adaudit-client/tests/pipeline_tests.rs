//! Submission pipeline stage-ordering and failure-isolation tests
//!
//! Fakes stand in for the backend and object storage so each stage's
//! call count can be verified: a failure at stage n must leave every
//! later stage untouched.

use adaudit_client::api::ApiError;
use adaudit_client::pipeline::{
    AuditProcessor, CredentialIssuer, ObjectStore, SubmitError, SubmitPipeline,
    DEFAULT_TARGET_AUDIENCE,
};
use adaudit_client::storage::StorageError;
use adaudit_common::types::{AuditRecord, UploadCredential, UserId};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

fn sample_record() -> AuditRecord {
    serde_json::from_str(
        r#"{
            "id": 42,
            "user_id": "7",
            "s3_key": "uploads/banner.png",
            "target_audience": "Young professionals",
            "score": 77,
            "analysis_json": {"summary": "looks fine", "confidence": 90}
        }"#,
    )
    .unwrap()
}

struct FakeIssuer {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeIssuer {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }
}

#[async_trait]
impl CredentialIssuer for FakeIssuer {
    async fn upload_credential(
        &self,
        _file_name: &str,
        _content_type: &str,
    ) -> Result<UploadCredential, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ApiError::Network("connection refused".to_string()));
        }
        Ok(UploadCredential {
            upload_url: "https://bucket.example.com/presigned".to_string(),
            s3_key: "uploads/banner.png".to_string(),
        })
    }
}

struct FakeStore {
    calls: AtomicUsize,
    fail: bool,
    seen_content_type: Mutex<Option<String>>,
}

impl FakeStore {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
            seen_content_type: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_object(
        &self,
        _upload_url: &str,
        _body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_content_type.lock().unwrap() = Some(content_type.to_string());
        if self.fail {
            return Err(StorageError::Status(403, "signature mismatch".to_string()));
        }
        Ok(())
    }
}

struct FakeProcessor {
    calls: AtomicUsize,
    fail: bool,
    seen_audience: Mutex<Option<String>>,
}

impl FakeProcessor {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
            seen_audience: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AuditProcessor for FakeProcessor {
    async fn process_audit(
        &self,
        _user_id: &UserId,
        _s3_key: &str,
        target_audience: &str,
    ) -> Result<AuditRecord, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.seen_audience.lock().unwrap() = Some(target_audience.to_string());
        if self.fail {
            return Err(ApiError::Status(500, "scoring failed".to_string()));
        }
        Ok(sample_record())
    }
}

fn temp_image(extension: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(format!("creative.{extension}"));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"not really image bytes").unwrap();
    (dir, path)
}

fn user() -> UserId {
    UserId("7".to_string())
}

#[tokio::test]
async fn successful_submission_returns_server_payload() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    let record = pipeline
        .submit_audit(&image, "Young professionals", Some(&user()))
        .await
        .unwrap();

    assert_eq!(record.id.to_string(), "42");
    assert_eq!(record.score, 77);
    assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_session_fails_before_any_network_call() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    let err = pipeline
        .submit_audit(&image, "anyone", None)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::NotAuthenticated));
    assert_eq!(issuer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blank_session_id_counts_as_not_logged_in() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    let blank = UserId("   ".to_string());
    let err = pipeline
        .submit_audit(&image, "anyone", Some(&blank))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::NotAuthenticated));
    assert_eq!(issuer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn credential_failure_stops_before_upload() {
    let issuer = FakeIssuer::new(true);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    let err = pipeline
        .submit_audit(&image, "anyone", Some(&user()))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::CredentialRequest(_)));
    assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upload_failure_stops_before_processing() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(true);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    let err = pipeline
        .submit_audit(&image, "anyone", Some(&user()))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::UploadTransport(_)));
    assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreadable_image_is_an_upload_failure() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);

    let err = pipeline
        .submit_audit(
            std::path::Path::new("/definitely/not/here.png"),
            "anyone",
            Some(&user()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::UploadTransport(_)));
    // Credential was requested, but the storage PUT never happened
    assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    assert_eq!(processor.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn processing_failure_surfaces_distinct_error() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(true);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    let err = pipeline
        .submit_audit(&image, "anyone", Some(&user()))
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::ProcessingRequest(_)));
    assert_eq!(processor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn blank_audience_defaults_to_placeholder() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("png");

    pipeline
        .submit_audit(&image, "   ", Some(&user()))
        .await
        .unwrap();

    assert_eq!(
        processor.seen_audience.lock().unwrap().as_deref(),
        Some(DEFAULT_TARGET_AUDIENCE)
    );
}

#[tokio::test]
async fn content_type_follows_file_extension() {
    let issuer = FakeIssuer::new(false);
    let store = FakeStore::new(false);
    let processor = FakeProcessor::new(false);
    let pipeline = SubmitPipeline::new(&issuer, &store, &processor);
    let (_dir, image) = temp_image("jpg");

    pipeline
        .submit_audit(&image, "anyone", Some(&user()))
        .await
        .unwrap();

    assert_eq!(
        store.seen_content_type.lock().unwrap().as_deref(),
        Some("image/jpeg")
    );
}
