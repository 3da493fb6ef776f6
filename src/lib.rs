//! # moodlog
//!
//! Client for the mood-journal backend. The backend authenticates every
//! request with HTTP Basic credentials, so this crate owns the client-side
//! session model layered on top of it: credential encoding, a persisted
//! session mirror, the authenticated transport, role inference, and the
//! route/admin gates consulted by the view layer.
//!
//! The `moodlog` binary in `main.rs` is one such view layer.

pub mod app;
pub mod config;
pub mod net;
pub mod state;
pub mod util;

pub use app::{Dashboard, MoodLog, ProfileOutcome};
pub use config::ClientConfig;
pub use net::credential::Credential;
pub use net::error::{ApiError, ErrorKind};
pub use state::session::SessionContext;
