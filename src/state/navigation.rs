//! View routing state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The view layer records where the user is with [`Navigator::navigate`]; the
//! transport calls [`Navigator::redirect_to_login`] after a 401. Guard policy
//! lives in `util::guard` and only reads routes.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Every view the client can show.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Dashboard,
    Journals,
    JournalNew,
    JournalEdit(String),
    Profile,
    Admin,
}

impl Route {
    /// The view authenticated users land on.
    pub const DEFAULT: Self = Self::Dashboard;

    /// Resolve a path. `/` and unknown paths fall back to the default view.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["journals"] => Self::Journals,
            ["journals", "new"] => Self::JournalNew,
            ["journals", "edit", id] => Self::JournalEdit((*id).to_owned()),
            ["profile"] => Self::Profile,
            ["admin"] => Self::Admin,
            _ => Self::DEFAULT,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_owned(),
            Self::Register => "/register".to_owned(),
            Self::Dashboard => "/dashboard".to_owned(),
            Self::Journals => "/journals".to_owned(),
            Self::JournalNew => "/journals/new".to_owned(),
            Self::JournalEdit(id) => format!("/journals/edit/{id}"),
            Self::Profile => "/profile".to_owned(),
            Self::Admin => "/admin".to_owned(),
        }
    }

    /// Views only shown to anonymous visitors.
    #[must_use]
    pub fn is_public_only(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }

    #[must_use]
    pub fn is_admin_only(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Tracks the current view.
#[derive(Debug)]
pub struct Navigator {
    current: Mutex<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Login)
    }
}

impl Navigator {
    #[must_use]
    pub fn new(start: Route) -> Self {
        Self { current: Mutex::new(start) }
    }

    #[must_use]
    pub fn current(&self) -> Route {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn navigate(&self, route: Route) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = route;
    }

    /// Move to the login view unless already there. Returns whether it moved.
    pub fn redirect_to_login(&self) -> bool {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == Route::Login {
            return false;
        }
        tracing::info!(from = %*current, "redirecting to login");
        *current = Route::Login;
        true
    }
}
