//! # AdAudit Common Library
//!
//! Shared code for the AdAudit client workspace:
//! - Error types
//! - Configuration loading and root folder resolution
//! - Wire types for the audit backend (records, history pages, profiles)
//! - Decoded insight types derived from AI analysis output

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{DecodedInsight, RiskLevel, UserId};
