//! Audit backend API client
//!
//! Typed wrapper over the JSON REST backend. Every operation issues exactly
//! one request: failures surface immediately, retry is a full re-invocation
//! by the caller.

use adaudit_common::config::Settings;
use adaudit_common::types::{
    AuditRecord, HistoryPage, RecordId, UploadCredential, UserId, UserProfile,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("AdAudit/", env!("CARGO_PKG_VERSION"));

/// Backend endpoint paths, relative to the /api/v1/ base
mod endpoints {
    pub const LOGIN: &str = "auth/login";
    pub const SIGNUP: &str = "auth/signup";
    pub const VERIFY_OTP: &str = "auth/verify-otp";
    pub const PROFILE: &str = "auth/profile";
    pub const UPLOAD_URL: &str = "s3/upload-url";
    pub const PROCESS_AUDIT: &str = "audits/process";
    pub const AUDIT_HISTORY: &str = "audits/history";
    pub const AUDITS: &str = "audits";
}

/// Backend client errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Status(u16, String),

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),
}

/// Either `{user: {id}}` or a bare `{id}` - the backend is inconsistent
/// between the login and signup responses
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    id: Option<UserId>,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    id: UserId,
}

impl UserEnvelope {
    fn into_user_id(self) -> Result<UserId, ApiError> {
        let id = self
            .user
            .map(|u| u.id)
            .or(self.id)
            .ok_or_else(|| ApiError::MalformedResponse("no user id in response".to_string()))?;
        if id.is_empty() {
            return Err(ApiError::MalformedResponse(
                "empty user id in response".to_string(),
            ));
        }
        Ok(id)
    }
}

/// Audit backend API client
pub struct BackendClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Request an OTP for an existing account
    pub async fn login(&self, email: &str) -> Result<UserId, ApiError> {
        debug!(email = %email, "Requesting login OTP");
        let envelope: UserEnvelope = self
            .post_json(endpoints::LOGIN, &json!({ "email": email }))
            .await?;
        envelope.into_user_id()
    }

    /// Create an account and request an OTP
    pub async fn signup(&self, name: &str, email: &str) -> Result<UserId, ApiError> {
        debug!(email = %email, "Requesting signup OTP");
        let envelope: UserEnvelope = self
            .post_json(endpoints::SIGNUP, &json!({ "name": name, "email": email }))
            .await?;
        envelope.into_user_id()
    }

    /// Validate the 6-digit code for both login and signup flows
    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<UserId, ApiError> {
        let envelope: UserEnvelope = self
            .post_json(endpoints::VERIFY_OTP, &json!({ "email": email, "otp": otp }))
            .await?;
        let user_id = envelope.into_user_id()?;
        info!(user_id = %user_id, "OTP verified");
        Ok(user_id)
    }

    /// Fetch the profile (name, remaining quota) for a user
    pub async fn profile(&self, user_id: &UserId) -> Result<UserProfile, ApiError> {
        let path = format!("{}/{}", endpoints::PROFILE, user_id);
        self.get_json(&path, &[]).await
    }

    /// Obtain a short-lived credential for one direct upload
    pub async fn upload_credential(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadCredential, ApiError> {
        let credential: UploadCredential = self
            .get_json(
                endpoints::UPLOAD_URL,
                &[("file_name", file_name), ("content_type", content_type)],
            )
            .await?;

        if credential.upload_url.trim().is_empty() || credential.s3_key.trim().is_empty() {
            return Err(ApiError::MalformedResponse(
                "upload credential missing upload_url or s3_key".to_string(),
            ));
        }

        debug!(s3_key = %credential.s3_key, "Obtained upload credential");
        Ok(credential)
    }

    /// Trigger server-side AI scoring of an uploaded creative
    ///
    /// Scoring runs synchronously on the server; the response body is the
    /// resulting audit record.
    pub async fn process_audit(
        &self,
        user_id: &UserId,
        s3_key: &str,
        target_audience: &str,
    ) -> Result<AuditRecord, ApiError> {
        let record: AuditRecord = self
            .post_json(
                endpoints::PROCESS_AUDIT,
                &json!({
                    "user_id": user_id,
                    "s3_key": s3_key,
                    "target_audience": target_audience,
                }),
            )
            .await?;
        info!(audit_id = %record.id, score = record.score, "Audit processed");
        Ok(record)
    }

    /// Fetch one page of audit history for a user
    pub async fn history(
        &self,
        user_id: &UserId,
        page: i64,
        limit: i64,
    ) -> Result<HistoryPage, ApiError> {
        self.get_json(
            endpoints::AUDIT_HISTORY,
            &[
                ("user_id", user_id.as_str()),
                ("page", &page.to_string()),
                ("limit", &limit.to_string()),
            ],
        )
        .await
    }

    /// Fetch a single audit record by id
    pub async fn audit_by_id(&self, id: &RecordId) -> Result<AuditRecord, ApiError> {
        let path = format!("{}/{}", endpoints::AUDITS, id);
        self.get_json(&path, &[]).await
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self
            .http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode_response(response).await
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let mut request = self.http_client.get(self.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Self::decode_response(response).await
    }

    async fn decode_response<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = if error_text.trim().is_empty() {
                "request failed".to_string()
            } else {
                error_text
            };
            return Err(ApiError::Status(status.as_u16(), message));
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaudit_common::config::Settings;

    fn client() -> BackendClient {
        BackendClient::new(&Settings {
            api_base_url: "http://localhost:3000/api/v1/".to_string(),
            ..Settings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = client();
        assert_eq!(
            client.url(endpoints::LOGIN),
            "http://localhost:3000/api/v1/auth/login"
        );
    }

    #[test]
    fn test_user_id_from_nested_envelope() {
        let envelope: UserEnvelope =
            serde_json::from_str(r#"{"user": {"id": 17}}"#).unwrap();
        assert_eq!(envelope.into_user_id().unwrap().as_str(), "17");
    }

    #[test]
    fn test_user_id_from_flat_envelope() {
        let envelope: UserEnvelope = serde_json::from_str(r#"{"id": "u-9"}"#).unwrap();
        assert_eq!(envelope.into_user_id().unwrap().as_str(), "u-9");
    }

    #[test]
    fn test_nested_envelope_wins_over_flat() {
        let envelope: UserEnvelope =
            serde_json::from_str(r#"{"user": {"id": "nested"}, "id": "flat"}"#).unwrap();
        assert_eq!(envelope.into_user_id().unwrap().as_str(), "nested");
    }

    #[test]
    fn test_missing_user_id_is_malformed() {
        let envelope: UserEnvelope = serde_json::from_str(r#"{"ok": true}"#).unwrap();
        assert!(matches!(
            envelope.into_user_id(),
            Err(ApiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_empty_user_id_is_malformed() {
        let envelope: UserEnvelope = serde_json::from_str(r#"{"id": "  "}"#).unwrap();
        assert!(matches!(
            envelope.into_user_id(),
            Err(ApiError::MalformedResponse(_))
        ));
    }
}
