//! Session context: the single owner of authentication state.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two states, Anonymous (`None`) and Authenticated (`Some(Session)`). Every
//! mutation goes through a named transition on [`SessionContext`]; the
//! persisted store is written inside the same critical section so no observer
//! ever sees an authenticated context whose store is empty.
//!
//! State is published over a `tokio::sync::watch` channel. Route guards and
//! the CLI read snapshots or subscribe for changes.
//!
//! TRADE-OFFS
//! ==========
//! A restored session is trusted without a round trip. The first request that
//! comes back 401 tears it down through [`SessionContext::expire`].

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use super::store::SessionStore;
use crate::net::credential::Credential;
use crate::net::error::ApiError;
use crate::net::probe::{self, IdentityProbe};
use crate::net::types::{SessionUser, UserPatch};
use crate::util::validate;

/// Credential plus the user it resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub credential: Credential,
    pub user: SessionUser,
}

pub struct SessionContext {
    state: watch::Sender<Option<Session>>,
    store: Arc<dyn SessionStore>,
    generation: AtomicU64,
}

impl SessionContext {
    /// Start from whatever the store holds. A stored session is taken as-is.
    #[must_use]
    pub fn restore(store: Arc<dyn SessionStore>) -> Self {
        let initial = store.load();
        if let Some(session) = &initial {
            tracing::debug!(user = %session.user.user_name, "restored persisted session");
        }
        let (state, _) = watch::channel(initial);
        Self { state, store, generation: AtomicU64::new(0) }
    }

    /// Watch for session changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<Session> {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_some()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().as_ref().map(|s| s.user.clone())
    }

    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.state.borrow().as_ref().map(|s| s.credential.clone())
    }

    /// Counts completed transitions. Lets callers tell "changed" from "same".
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Verify `user_name`/`password`, infer the role, persist, and become
    /// Authenticated. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank input, [`ApiError::InvalidCredentials`]
    /// when verification is rejected, [`ApiError::Network`] when the backend is
    /// unreachable, or [`ApiError::Storage`] when the session cannot be persisted.
    pub async fn login(&self, probe: &dyn IdentityProbe, user_name: &str, password: &str) -> Result<SessionUser, ApiError> {
        validate::login(user_name, password)?;
        let credential = Credential::encode(user_name, password);
        let user = probe::resolve_user(probe, &credential, user_name).await?;
        let session = Session { credential, user: user.clone() };

        let mut saved = Ok(());
        self.state.send_if_modified(|state| {
            saved = self.store.save(&session);
            if saved.is_err() {
                return false;
            }
            *state = Some(session);
            self.bump();
            true
        });
        saved?;

        tracing::info!(user = %user.user_name, admin = user.is_admin(), "logged in");
        Ok(user)
    }

    /// Drop the session locally. Never fails and never touches the network.
    /// Returns whether a session was actually dropped.
    pub fn logout(&self) -> bool {
        let changed = self.state.send_if_modified(|state| {
            self.clear_store();
            if state.take().is_none() {
                return false;
            }
            self.bump();
            true
        });
        if changed {
            tracing::info!("logged out");
        }
        changed
    }

    /// Merge `patch` into the current user and persist it. The credential is
    /// left alone even when the backend-side password changed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotSignedIn`] when anonymous, or [`ApiError::Storage`]
    /// if the merged user cannot be persisted (the old user is kept).
    pub fn update_user(&self, patch: UserPatch) -> Result<SessionUser, ApiError> {
        let mut result = Err(ApiError::NotSignedIn);
        self.state.send_if_modified(|state| {
            let Some(current) = state.as_ref() else {
                return false;
            };
            let mut merged = current.clone();
            patch.apply(&mut merged.user);
            if let Err(e) = self.store.save(&merged) {
                result = Err(e.into());
                return false;
            }
            result = Ok(merged.user.clone());
            *state = Some(merged);
            self.bump();
            true
        });
        result
    }

    /// Forced logout after the transport saw a 401 for a request sent with
    /// `rejected`. Only tears down the session that credential belongs to;
    /// a late rejection from an earlier session, or a second rejection of the
    /// same one, is a no-op. Returns whether the session was dropped.
    pub fn expire(&self, rejected: Option<&Credential>) -> bool {
        let changed = self.state.send_if_modified(|state| {
            let matches = state.as_ref().is_some_and(|s| Some(&s.credential) == rejected);
            if !matches {
                return false;
            }
            self.clear_store();
            *state = None;
            self.bump();
            true
        });
        if changed {
            tracing::warn!("session rejected by server; logged out");
        }
        changed
    }

    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
