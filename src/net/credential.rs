//! HTTP Basic credential encoding.
//!
//! DESIGN
//! ======
//! The backend is stateless Basic auth, so the "token" the client keeps is the
//! base64 of `user:password` and nothing more. It is a bearer secret: the
//! client never decodes it, and `Debug` output redacts it.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Opaque transport credential derived from a user name and password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Encode `user_name:password` as a Basic credential.
    ///
    /// No validation happens here; empty or odd inputs are encoded as given.
    #[must_use]
    pub fn encode(user_name: &str, password: &str) -> Self {
        Self(STANDARD.encode(format!("{user_name}:{password}")))
    }

    /// The encoded credential as persisted under `authToken`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("Basic {}", self.as_str())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
