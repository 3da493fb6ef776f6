//! Error taxonomy for every backend-facing operation.
//!
//! ERROR HANDLING
//! ==============
//! Each failure resolves to one [`ErrorKind`]. The session layer never retries;
//! callers that want retry/backoff decide from the kind alone. Only
//! [`ErrorKind::Unauthorized`] implies the session was torn down.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::state::store::StoreError;
use crate::util::validate::ValidationError;

/// Paths under this prefix need the admin role.
pub const ADMIN_PATH_PREFIX: &str = "/admin/";

/// Coarse classification of an [`ApiError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Form input rejected locally; nothing was sent.
    Validation,
    /// Login verification failed; the session stayed anonymous.
    Authentication,
    /// The transport saw a 401 (or no session exists); the user is logged out.
    Unauthorized,
    /// 403, or 404 on an admin endpoint. Expected for non-admins.
    NotAuthorized,
    /// No response arrived. The session is untouched.
    Network,
    /// 5xx from the backend.
    Server,
    /// Any other rejected request, bad payload, or local persistence failure.
    Domain,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid credentials")]
    InvalidCredentials,

    /// A request was rejected with 401; the session has been cleared.
    #[error("session rejected by server; logged out")]
    Unauthorized,

    /// The operation needs a session and there is none.
    #[error("not signed in")]
    NotSignedIn,

    /// The backend refused a privileged call (403, or 404 under `/admin`).
    #[error("not authorized (status {status})")]
    Forbidden { status: u16, body: String },

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("session storage failed: {0}")]
    Storage(#[from] StoreError),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidCredentials => ErrorKind::Authentication,
            Self::Unauthorized | Self::NotSignedIn => ErrorKind::Unauthorized,
            Self::Forbidden { .. } => ErrorKind::NotAuthorized,
            Self::Status { status, .. } => status_kind(*status),
            Self::Network(_) => ErrorKind::Network,
            Self::Decode(_) | Self::Storage(_) | Self::HttpClientBuild(_) => ErrorKind::Domain,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
            Self::Forbidden { .. } => "E_FORBIDDEN",
            Self::Status { .. } => "E_STATUS",
            Self::Network(_) => "E_NETWORK",
            Self::Decode(_) => "E_DECODE",
            Self::Storage(_) => "E_STORAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Map a `reqwest` failure. Anything that is not a body decode failure
    /// means no usable response arrived.
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Error for a non-2xx, non-401 reply to `path`. A 404 is only a refusal on
/// admin endpoints; elsewhere it is an ordinary missing resource.
pub(crate) fn rejection(path: &str, status: u16, body: String) -> ApiError {
    let privileged = path.starts_with(ADMIN_PATH_PREFIX);
    match status {
        403 => ApiError::Forbidden { status, body },
        404 if privileged => ApiError::Forbidden { status, body },
        _ => ApiError::Status { status, body },
    }
}

fn status_kind(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::NotAuthorized,
        500..=599 => ErrorKind::Server,
        _ => ErrorKind::Domain,
    }
}
