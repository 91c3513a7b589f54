//! adaudit-client library interface
//!
//! Implements the client side of the ad creative audit product:
//! - Typed HTTP client for the audit backend
//! - Direct-to-object-storage upload client
//! - Local session store (single opaque user id)
//! - Upload-and-audit submission pipeline
//! - Defensive decoder for AI analysis output
//! - HTML report rendering for export

pub mod api;
pub mod insight;
pub mod media;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod storage;

pub use api::{ApiError, BackendClient};
pub use insight::decode;
pub use pipeline::{SubmitError, SubmitPipeline};
pub use session::SessionStore;
pub use storage::{StorageClient, StorageError};
