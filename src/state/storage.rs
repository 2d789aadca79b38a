//! Session storage implementation
//!
//! Persists the signed-in session as a JSON file so it survives between
//! invocations. An unreadable file is treated as no session and removed.

use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

use crate::config::SessionConfig;
use crate::utils::errors::Result;
use super::session::Session;

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(&config.storage_path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Write the session, replacing any previous one
    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let serialized = match serde_json::to_string_pretty(session) {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Failed to serialize session");
                return Err(e.into());
            }
        };

        tokio::fs::write(&self.path, serialized).await?;
        debug!(path = %self.path.display(), email = %session.user.email, "Session saved");
        Ok(())
    }

    /// Read the stored session, if any
    pub async fn load(&self) -> Result<Option<Session>> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored session");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Session>(&data) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Stored session is unreadable, removing");
                self.delete().await?;
                Ok(None)
            }
        }
    }

    pub async fn delete(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "Session deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
