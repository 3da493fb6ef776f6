//! Pure helpers consulted by the view layer.
//!
//! SYSTEM CONTEXT
//! ==============
//! These functions take state snapshots and return decisions; none of them
//! perform I/O, which keeps route and form policy trivially testable.

pub mod guard;
pub mod validate;
