//! Application facade wiring the session core to the backend calls.
//!
//! SYSTEM CONTEXT
//! ==============
//! View layers (the CLI in `main.rs`, or an embedder) hold one [`MoodLog`].
//! It owns the transport, which owns the session context and navigator, and
//! exposes the operations the screens need. Validation runs here before any
//! request is built; session transitions stay inside `SessionContext`.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use crate::config::{ClientConfig, Timeouts};
use crate::net::api;
use crate::net::error::ApiError;
use crate::net::transport::Transport;
use crate::net::types::{JournalEntry, ProfileUpdate, SessionUser, User, UserPatch};
use crate::state::navigation::{Navigator, Route};
use crate::state::session::SessionContext;
use crate::state::store::{FileSessionStore, SessionStore};
use crate::util::guard::{self, Navigation};
use crate::util::validate;

/// Number of entries shown on the dashboard.
pub const RECENT_ENTRY_LIMIT: usize = 5;

pub const ADMIN_ROLE: &str = "ADMIN";
pub const USER_ROLE: &str = "USER";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dashboard {
    pub greeting: String,
    pub recent: Vec<JournalEntry>,
}

/// Result of a profile update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// The change was applied to the current session.
    Applied(SessionUser),
    /// User name or password changed, so the stored Basic credential no
    /// longer matches. The session was dropped and the user must log in again.
    ReloginRequired,
}

pub struct MoodLog {
    transport: Transport,
}

impl MoodLog {
    /// Build a client backed by the file store in `config.session_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let store = Arc::new(FileSessionStore::new(config.session_dir.clone()));
        Self::with_store(&config.api_url, config.timeouts, store)
    }

    /// Build a client over any session medium. The session is restored from
    /// it and the navigator starts on the view the guard allows.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_store(api_url: &str, timeouts: Timeouts, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let session = Arc::new(SessionContext::restore(store));
        let start = if session.is_authenticated() { Route::DEFAULT } else { Route::Login };
        let navigator = Arc::new(Navigator::new(start));
        let transport = Transport::new(api_url, timeouts, session, navigator)?;
        Ok(Self { transport })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        self.transport.session()
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<Navigator> {
        self.transport.navigator()
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Run the route guard and admin gate for `path` and move there.
    pub fn open(&self, path: &str) -> Navigation {
        self.open_route(&Route::parse(path))
    }

    /// See [`MoodLog::open`].
    pub fn open_route(&self, route: &Route) -> Navigation {
        let user = self.session().current_user();
        let nav = guard::resolve(route, user.as_ref());
        self.navigator().navigate(nav.target().clone());
        nav
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// # Errors
    ///
    /// See [`SessionContext::login`].
    pub async fn login(&self, user_name: &str, password: &str) -> Result<SessionUser, ApiError> {
        let user = self.session().login(&self.transport, user_name, password).await?;
        self.navigator().navigate(Route::DEFAULT);
        Ok(user)
    }

    /// Local logout. Returns whether a session was dropped.
    pub fn logout(&self) -> bool {
        let dropped = self.session().logout();
        self.navigator().navigate(Route::Login);
        dropped
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's rejection.
    pub async fn register(&self, user: &User) -> Result<(), ApiError> {
        validate::new_account(user)?;
        api::register(&self.transport, user).await
    }

    // =========================================================================
    // DASHBOARD / JOURNAL
    // =========================================================================

    /// Greeting plus the most recent entries.
    ///
    /// # Errors
    ///
    /// Returns the first failing call's error.
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        let greeting = api::greeting(&self.transport).await?;
        let mut recent = api::list_entries(&self.transport).await?;
        recent.truncate(RECENT_ENTRY_LIMIT);
        Ok(Dashboard { greeting, recent })
    }

    /// # Errors
    ///
    /// Returns the transport or status error.
    pub async fn entries(&self) -> Result<Vec<JournalEntry>, ApiError> {
        api::list_entries(&self.transport).await
    }

    /// Entries whose title or content contains `term`, ignoring case. A blank
    /// term returns every entry.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error.
    pub async fn search_entries(&self, term: &str) -> Result<Vec<JournalEntry>, ApiError> {
        let mut entries = api::list_entries(&self.transport).await?;
        entries.retain(|entry| entry.matches(term));
        Ok(entries)
    }

    /// # Errors
    ///
    /// Returns the transport or status error.
    pub async fn entry(&self, id: &str) -> Result<JournalEntry, ApiError> {
        api::get_entry(&self.transport, id).await
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's rejection.
    pub async fn create_entry(&self, entry: &JournalEntry) -> Result<JournalEntry, ApiError> {
        validate::journal_entry(entry)?;
        api::create_entry(&self.transport, entry).await
    }

    /// # Errors
    ///
    /// Returns a validation error or the backend's rejection.
    pub async fn update_entry(&self, id: &str, entry: &JournalEntry) -> Result<JournalEntry, ApiError> {
        validate::journal_entry(entry)?;
        api::update_entry(&self.transport, id, entry).await
    }

    /// # Errors
    ///
    /// Returns the transport or status error.
    pub async fn delete_entry(&self, id: &str) -> Result<(), ApiError> {
        api::delete_entry(&self.transport, id).await
    }

    // =========================================================================
    // PROFILE
    // =========================================================================

    /// Push a profile change to the backend, then reconcile the session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotSignedIn`] when anonymous, a validation error,
    /// or the backend's rejection. On error the session is unchanged unless
    /// the backend answered 401.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<ProfileOutcome, ApiError> {
        let current = self.session().current_user().ok_or(ApiError::NotSignedIn)?;
        validate::profile_update(update)?;

        let password = update.password.clone().filter(|p| !p.is_empty());
        let body = User {
            user_name: update.user_name.clone(),
            email: update.email.clone(),
            password: password.clone(),
            ..User::default()
        };
        api::update_user(&self.transport, &body).await?;

        if password.is_some() || update.user_name != current.user_name {
            tracing::info!("credential changed; re-login required");
            self.logout();
            return Ok(ProfileOutcome::ReloginRequired);
        }

        let patch = UserPatch { user_name: None, email: update.email.clone(), sentiment_analysis: None };
        Ok(ProfileOutcome::Applied(self.session().update_user(patch)?))
    }

    /// Delete the account on the backend and drop the local session.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error; the session is kept on failure.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        api::delete_user(&self.transport).await?;
        self.logout();
        Ok(())
    }

    // =========================================================================
    // ADMIN
    // =========================================================================

    /// Whether admin-only UI should be shown for the current session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        guard::show_admin_ui(self.session().current_user().as_ref())
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Forbidden`] if the backend refuses.
    pub async fn users(&self) -> Result<Vec<User>, ApiError> {
        api::list_users(&self.transport).await
    }

    /// Provision an admin account. Roles are set to `ADMIN` + `USER` and
    /// sentiment analysis defaults to on.
    ///
    /// # Errors
    ///
    /// Returns a validation error or the backend's rejection.
    pub async fn create_admin(&self, user: &User) -> Result<(), ApiError> {
        validate::new_account(user)?;
        let admin = User {
            roles: Some(vec![ADMIN_ROLE.to_owned(), USER_ROLE.to_owned()]),
            sentiment_analysis: Some(user.sentiment_analysis.unwrap_or(true)),
            ..user.clone()
        };
        api::create_admin(&self.transport, &admin).await
    }
}
