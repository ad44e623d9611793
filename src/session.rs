//! Session tokens and pluggable persistence
//!
//! The flow core only produces a `SessionTokens` value; where it lives
//! afterwards is the caller's choice via `TokenStore`. A file-backed store is
//! shipped for the CLI and an in-memory one for embedding and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::Result;

/// JWT pair plus the user object returned by the backend exchange
///
/// The user object is opaque to this crate; the reference backend returns
/// `{id, username, email, first_name, last_name}` but callers may see
/// whatever their backend ships.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    /// JWT access token
    pub access: String,

    /// JWT refresh token
    pub refresh: String,

    /// The authenticated user, as returned by the backend
    pub user: serde_json::Value,
}

/// Destination for session tokens after a successful sign-in
///
/// Implementations decide the mechanism (file, keychain, memory). The
/// coordinator persists exactly once per successful invocation and never on
/// failure.
pub trait TokenStore: Send + Sync {
    fn persist(&self, tokens: &SessionTokens) -> Result<()>;
    fn load(&self) -> Result<Option<SessionTokens>>;
    fn clear(&self) -> Result<()>;
}

/// In-memory token store
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<SessionTokens>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn persist(&self, tokens: &SessionTokens) -> Result<()> {
        *self.inner.lock().unwrap() = Some(tokens.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionTokens>> {
        Ok(self.inner.lock().unwrap().clone())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap() = None;
        Ok(())
    }
}

/// On-disk session record with a save timestamp
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    #[serde(flatten)]
    tokens: SessionTokens,
    saved_at: DateTime<Utc>,
}

/// File-backed token store, ~/.loginflow/session.json by default
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store at the default location under the config directory
    pub fn new() -> Self {
        Self {
            path: crate::config::config_dir().join("session.json"),
        }
    }

    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    fn persist(&self, tokens: &SessionTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let record = StoredSession {
            tokens: tokens.clone(),
            saved_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&record)?;
        std::fs::write(&self.path, content)?;

        // Session tokens are bearer credentials; keep them owner-readable
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms)?;
        }

        Ok(())
    }

    fn load(&self) -> Result<Option<SessionTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let record: StoredSession = serde_json::from_str(&content)?;
        Ok(Some(record.tokens))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
