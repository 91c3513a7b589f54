//! Wire types for the audit backend plus client-local derived types
//!
//! The backend is loose about identifier shapes (numbers and strings both
//! occur), so identifiers deserialize through an untagged helper and are
//! normalized to strings on the client side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw identifier as the server sends it: numeric or string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(i64),
    Text(String),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Num(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

/// Opaque user identifier established at OTP verification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId")]
pub struct UserId(pub String);

impl From<RawId> for UserId {
    fn from(raw: RawId) -> Self {
        UserId(raw.into())
    }
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() honors width/alignment flags, write! would drop them
        f.pad(&self.0)
    }
}

/// Server-assigned audit record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawId")]
pub struct RecordId(pub String);

impl From<RawId> for RecordId {
    fn from(raw: RawId) -> Self {
        RecordId(raw.into())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Risk level attached to an audit by the AI scoring step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    /// Case-insensitive parse; anything unrecognized maps to Unknown
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }

    /// Display color used by report rendering
    pub fn color(&self) -> &'static str {
        match self {
            RiskLevel::Low => "#10b981",
            RiskLevel::Medium => "#f59e0b",
            RiskLevel::High => "#ef4444",
            RiskLevel::Unknown => "#818cf8",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        };
        write!(f, "{}", label)
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Low
    }
}

/// AI analysis payload attached to an audit record
///
/// Every field is optional: the AI step sometimes emits structured JSON as a
/// string inside `summary` and sometimes plain prose, and older records lack
/// `risk`/`confidence` entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisJson {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub risk: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Server-owned audit record, immutable from the client's perspective
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: RecordId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub s3_key: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub analysis_json: Option<AnalysisJson>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AuditRecord {
    /// File name shown for this record, derived from the storage key
    pub fn file_name(&self) -> &str {
        self.s3_key
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("Creative Analysis")
    }
}

/// One page of audit history as returned by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub items: Vec<AuditRecord>,
    #[serde(default)]
    pub total: i64,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// Remaining audit quota for a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Quota {
    #[serde(default)]
    pub remaining: i64,
}

/// User profile as returned by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub quota: Option<Quota>,
}

/// Ephemeral server-issued permission for a single direct upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadCredential {
    pub upload_url: String,
    pub s3_key: String,
}

/// Normalized, always-valid structure derived from an audit's AI output
///
/// Never fails to exist: absent or malformed analysis degrades to the
/// defaults rather than propagating an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedInsight {
    pub summary: String,
    pub risk: RiskLevel,
    pub confidence: f64,
    pub findings: Vec<String>,
}

impl Default for DecodedInsight {
    fn default() -> Self {
        Self {
            summary: String::new(),
            risk: RiskLevel::Low,
            confidence: 0.0,
            findings: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_from_number() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id.as_str(), "42");
    }

    #[test]
    fn test_user_id_from_string() {
        let id: UserId = serde_json::from_str("\"abc-123\"").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_id_display_honors_width_flags() {
        // Column layouts rely on padded ids
        assert_eq!(format!("{:<4}", UserId("7".to_string())), "7   ");
        assert_eq!(format!("{:<8}", RecordId("42".to_string())), "42      ");
        assert_eq!(format!("{:>4}", RecordId("42".to_string())), "  42");
    }

    #[test]
    fn test_risk_level_labels() {
        assert_eq!(RiskLevel::from_label("low"), RiskLevel::Low);
        assert_eq!(RiskLevel::from_label("MEDIUM"), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_label(" High "), RiskLevel::High);
        assert_eq!(RiskLevel::from_label("critical"), RiskLevel::Unknown);
        assert_eq!(RiskLevel::from_label(""), RiskLevel::Unknown);
    }

    #[test]
    fn test_risk_level_display_round_trip() {
        for risk in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            assert_eq!(RiskLevel::from_label(&risk.to_string()), risk);
        }
    }

    #[test]
    fn test_audit_record_tolerates_sparse_payload() {
        let record: AuditRecord =
            serde_json::from_str(r#"{"id": 7, "s3_key": "uploads/banner.png"}"#).unwrap();
        assert_eq!(record.id, RecordId("7".to_string()));
        assert_eq!(record.score, 0);
        assert!(record.analysis_json.is_none());
        assert!(record.created_at.is_none());
    }

    #[test]
    fn test_audit_record_file_name() {
        let record: AuditRecord =
            serde_json::from_str(r#"{"id": 1, "s3_key": "uploads/2024/banner.png"}"#).unwrap();
        assert_eq!(record.file_name(), "banner.png");

        let record: AuditRecord =
            serde_json::from_str(r#"{"id": 2, "s3_key": "uploads/"}"#).unwrap();
        assert_eq!(record.file_name(), "Creative Analysis");
    }

    #[test]
    fn test_audit_record_missing_key_is_error() {
        // s3_key is required: a credential or record without it is malformed
        let result: std::result::Result<AuditRecord, _> =
            serde_json::from_str(r#"{"id": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_page_defaults() {
        let page: HistoryPage = serde_json::from_str("{}").unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn test_decoded_insight_defaults() {
        let insight = DecodedInsight::default();
        assert_eq!(insight.summary, "");
        assert_eq!(insight.risk, RiskLevel::Low);
        assert_eq!(insight.confidence, 0.0);
        assert!(insight.findings.is_empty());
    }
}
