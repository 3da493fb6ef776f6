//! Durable mirror of the session.
//!
//! DESIGN
//! ======
//! The store is a shadow copy, written on every session mutation and read once
//! at startup. It is never consulted for the current credential while the
//! process runs; [`crate::state::session::SessionContext`] is the source of
//! truth.
//!
//! The document keeps the two fixed keys `authToken` and `user`. File writes go
//! to a sibling temp file that is renamed over the target, so a reader sees the
//! old session or the new one and never a torn write.
//!
//! ERROR HANDLING
//! ==============
//! `load` fails open: missing, unreadable, or corrupt data is "no session".

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::session::Session;
use crate::net::credential::Credential;
use crate::net::types::SessionUser;

pub const SESSION_FILE_NAME: &str = "session.json";

/// Both keys absent: loads as "no session" without a corruption warning.
const EMPTY_DOCUMENT: &str = "{}";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable key/value medium holding the session shadow.
pub trait SessionStore: Send + Sync {
    /// Replace any stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written; the previous session stays intact.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// The last saved session, or `None` if absent or unreadable.
    fn load(&self) -> Option<Session>;

    /// Remove the stored session. Clearing an empty store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

#[derive(Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "authToken")]
    auth_token: Option<Credential>,
    user: Option<SessionUser>,
}

fn encode_document(session: &Session) -> Result<String, StoreError> {
    let doc = StoredSession { auth_token: Some(session.credential.clone()), user: Some(session.user.clone()) };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn decode_document(raw: &str) -> Option<Session> {
    let doc = match serde_json::from_str::<StoredSession>(raw) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "persisted session is corrupt; starting logged out");
            return None;
        }
    };
    match (doc.auth_token, doc.user) {
        (Some(credential), Some(user)) => Some(Session { credential, user }),
        (None, None) => None,
        _ => {
            tracing::warn!("persisted session is incomplete; starting logged out");
            None
        }
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Session document in `<dir>/session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let path = dir.join(SESSION_FILE_NAME);
        Self { dir, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!("{SESSION_FILE_NAME}.tmp"))
    }
}

fn io_err<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> StoreError + 'a {
    move |source| StoreError::Io { op, path: path.to_path_buf(), source }
}

fn create_private(path: &Path) -> io::Result<fs::File> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt as _;
        options.mode(0o600);
    }
    options.open(path)
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let body = encode_document(session)?;
        fs::create_dir_all(&self.dir).map_err(io_err("create", &self.dir))?;

        let tmp = self.temp_path();
        let mut file = create_private(&tmp).map_err(io_err("open", &tmp))?;
        file.write_all(body.as_bytes()).map_err(io_err("write", &tmp))?;
        file.sync_all().map_err(io_err("sync", &tmp))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(io_err("rename", &self.path))
    }

    fn load(&self) -> Option<Session> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode_document(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.path.display(), "persisted session unreadable");
                None
            }
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        let err = match fs::remove_file(&self.path) {
            Ok(()) => return Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => e,
        };
        // The file could not be unlinked (e.g. read-only directory). Blank it in
        // place so a rejected credential is not restored on the next start.
        match blank_in_place(&self.path) {
            Ok(()) => {
                tracing::warn!(error = %err, path = %self.path.display(), "session file not removed; blanked instead");
                Ok(())
            }
            Err(_) => Err(io_err("remove", &self.path)(err)),
        }
    }
}

fn blank_in_place(path: &Path) -> io::Result<()> {
    let mut file = fs::OpenOptions::new().write(true).truncate(true).open(path)?;
    file.write_all(EMPTY_DOCUMENT.as_bytes())?;
    file.sync_all()
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-process medium. Holds the serialized document so corrupt data behaves
/// exactly as it would on disk.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the medium with an arbitrary document.
    #[must_use]
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self { raw: Mutex::new(Some(raw.into())) }
    }

    /// Whether anything is stored, valid or not.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).is_none()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let body = encode_document(session)?;
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(body);
        Ok(())
    }

    fn load(&self) -> Option<Session> {
        let raw = self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()?;
        decode_document(&raw)
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
