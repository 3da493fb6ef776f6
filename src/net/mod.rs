//! Networking modules for the journal backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `credential` builds the Basic credential, `transport` is the single request
//! pipeline every backend call goes through, `probe` infers the caller's role
//! at login, `api` holds the typed endpoint calls, and `types` defines the
//! shared wire schema.

pub mod api;
pub mod credential;
pub mod error;
pub mod probe;
pub mod transport;
pub mod types;
