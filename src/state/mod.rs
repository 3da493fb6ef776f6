//! Client-side state shared by the transport and the view layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` is the single writer of authentication state, `store` is its
//! durable mirror, and `navigation` tracks which view the user is on so the
//! transport can redirect after a rejected request.

pub mod navigation;
pub mod session;
pub mod store;
