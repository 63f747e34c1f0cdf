//! Durable storage for the signed-in session.
//!
//! The session lives in a single JSON file so it survives process restarts.
//! Every component that needs the identity goes through [`SessionStore`];
//! nothing else reads the file.
//!
//! Reads fail soft: a missing file, an unreadable file and a corrupt record
//! all mean "no session". Only writes report errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{Role, Session};

/// File-backed store for the active session.
///
/// Construct once and share it (usually behind an `Arc`). Login and logout
/// replace the whole record; it is never partially updated.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists `session`, replacing any previous one.
    ///
    /// The record is written to a sibling temp file and renamed into place so
    /// a crash never leaves a half-written session behind.
    pub fn set(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| SessionError::IoError(parent.to_path_buf(), e))?;
            }
        }

        let json = serde_json::to_vec_pretty(session).map_err(SessionError::EncodeError)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| SessionError::IoError(tmp.clone(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| SessionError::IoError(self.path.clone(), e))?;

        tracing::debug!(email = %session.email, role = %session.role, "session stored");
        Ok(())
    }

    /// Loads the current session.
    ///
    /// Returns `None` when there is no session, and also when the stored
    /// record can't be read or parsed (after logging a warning).
    pub fn get(&self) -> Option<Session> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Failed to read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice::<Session>(&bytes) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::warn!(
                    "Ignoring corrupt session file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Removes the stored session. Clearing an absent session is a no-op.
    pub fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("session cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::IoError(self.path.clone(), e)),
        }
    }

    /// True iff a session exists and has the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.get().is_some_and(|s| s.role == role)
    }

    pub fn is_customer(&self) -> bool {
        self.has_role(Role::Customer)
    }

    pub fn is_seller(&self) -> bool {
        self.has_role(Role::Seller)
    }

    /// Bearer token for authenticated calls, if signed in.
    pub fn token(&self) -> Option<String> {
        self.get().map(|s| s.token)
    }
}

/// Errors that can occur while writing the session.
#[derive(Debug)]
pub enum SessionError {
    /// I/O error writing or removing the session file.
    IoError(PathBuf, io::Error),
    /// The session could not be serialized.
    EncodeError(serde_json::Error),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::IoError(path, e) => {
                write!(f, "Session I/O error for {}: {}", path.display(), e)
            }
            SessionError::EncodeError(e) => write!(f, "Failed to encode session: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::IoError(_, e) => Some(e),
            SessionError::EncodeError(e) => Some(e),
        }
    }
}
