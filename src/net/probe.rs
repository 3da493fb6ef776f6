//! Role inference at login.
//!
//! DESIGN
//! ======
//! The backend has no "who am I / am I admin" endpoint. A credential is
//! verified with `GET /user`; if that succeeds, one call to the admin-only
//! `GET /admin/all-users` decides the role. Any failure of the second call
//! means "not an admin". The probe runs once per login and the result is kept
//! for the life of the session, so a role change on the backend is only seen
//! at the next login.
//!
//! The role gate built on this result is UX only. The backend still rejects
//! admin calls from non-admins.

#[cfg(test)]
#[path = "probe_test.rs"]
mod probe_test;

use super::credential::Credential;
use super::error::ApiError;
use super::types::SessionUser;

/// Identity endpoints used during login, called with an explicit candidate
/// credential rather than the session's current one.
#[async_trait::async_trait]
pub trait IdentityProbe: Send + Sync {
    /// Check that `credential` is accepted by the identity endpoint.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error from the identity call.
    async fn verify(&self, credential: &Credential) -> Result<(), ApiError>;

    /// Attempt the privileged listing with `credential`.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error from the privileged call.
    async fn probe_admin(&self, credential: &Credential) -> Result<(), ApiError>;
}

/// Verify `credential` and infer the role of `user_name`.
///
/// # Errors
///
/// Returns [`ApiError::Network`] if the identity endpoint is unreachable and
/// [`ApiError::InvalidCredentials`] for any other verification failure. The
/// admin probe never fails the login.
pub async fn resolve_user(probe: &dyn IdentityProbe, credential: &Credential, user_name: &str) -> Result<SessionUser, ApiError> {
    match probe.verify(credential).await {
        Ok(()) => {}
        Err(ApiError::Network(msg)) => return Err(ApiError::Network(msg)),
        Err(e) => {
            tracing::debug!(error = %e, "credential verification failed");
            return Err(ApiError::InvalidCredentials);
        }
    }

    let is_admin = match probe.probe_admin(credential).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "admin probe refused; treating as regular user");
            false
        }
    };
    Ok(SessionUser::resolved(user_name, is_admin))
}
