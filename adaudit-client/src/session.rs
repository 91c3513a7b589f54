//! Local session store
//!
//! The session is a single opaque user id persisted under the root folder.
//! It is written exactly once at OTP verification, read on every
//! authenticated operation, and cleared entirely at sign-out.

use adaudit_common::types::UserId;
use adaudit_common::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const SESSION_FILE: &str = "session";

/// File-backed session service
///
/// Explicit service rather than ambient global storage: callers receive a
/// `SessionStore` and ask it for the current user.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(root_folder: &Path) -> Self {
        Self {
            path: root_folder.join(SESSION_FILE),
        }
    }

    /// Current session user id, if logged in
    pub fn get(&self) -> Result<Option<UserId>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(UserId(trimmed.to_string())))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store the session user id (called once, at OTP verification)
    pub fn set(&self, user_id: &UserId) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, user_id.as_str())?;
        info!(user_id = %user_id, "Session stored");
        Ok(())
    }

    /// Clear all local session state (sign-out)
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session to clear");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
