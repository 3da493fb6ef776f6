//! Route guard and admin gate.
//!
//! SYSTEM CONTEXT
//! ==============
//! Re-evaluated on every navigation from the session snapshot. The admin gate
//! reads the role cached at login and is a UX affordance only; the backend is
//! the security boundary for admin calls.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::SessionUser;
use crate::state::navigation::Route;

/// Outcome of a navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

impl Navigation {
    /// The route that ends up on screen.
    #[must_use]
    pub fn target(&self) -> &Route {
        match self {
            Self::Render(route) | Self::Redirect(route) => route,
        }
    }
}

/// Login/register bounce authenticated users to the default view; everything
/// else bounces anonymous users to login.
#[must_use]
pub fn route_guard(route: &Route, is_authenticated: bool) -> Navigation {
    match (route.is_public_only(), is_authenticated) {
        (true, true) => Navigation::Redirect(Route::DEFAULT),
        (false, false) => Navigation::Redirect(Route::Login),
        _ => Navigation::Render(route.clone()),
    }
}

/// Whether admin-only UI should be shown.
#[must_use]
pub fn show_admin_ui(user: Option<&SessionUser>) -> bool {
    user.is_some_and(SessionUser::is_admin)
}

/// Admin views need the cached `ADMIN` role; others pass through.
#[must_use]
pub fn admin_gate(route: &Route, user: Option<&SessionUser>) -> Navigation {
    if route.is_admin_only() && !show_admin_ui(user) {
        return Navigation::Redirect(Route::DEFAULT);
    }
    Navigation::Render(route.clone())
}

/// Route guard first, then the admin gate on whatever the guard allowed.
#[must_use]
pub fn resolve(route: &Route, user: Option<&SessionUser>) -> Navigation {
    match route_guard(route, user.is_some()) {
        Navigation::Render(allowed) => admin_gate(&allowed, user),
        redirect @ Navigation::Redirect(_) => redirect,
    }
}
