//! REST calls for the journal backend.
//!
//! Every call goes through [`Transport::send`], so a 401 anywhere expires the
//! session the same way. Form validation happens in the caller before these
//! are reached.
//!
//! ERROR HANDLING
//! ==============
//! Callers get `Result<_, ApiError>` and pick the user-facing message from
//! [`ApiError::kind`]; nothing here retries.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;

use super::error::ApiError;
use super::transport::{ADMIN_PROBE_PATH, IDENTITY_PATH, Transport};
use super::types::{JournalEntry, User};
use crate::util::validate;

pub const REGISTER_PATH: &str = "/public/create-user";
pub const JOURNAL_PATH: &str = "/journal";
pub const CREATE_ADMIN_PATH: &str = "/admin/create-admin";

/// `/journal/{action}/{id}` with the id percent-encoded as a single segment,
/// so `/`, `?` and `#` in an id cannot retarget the request.
fn journal_endpoint(action: &str, id: &str) -> Result<String, ApiError> {
    validate::entry_id(id)?;
    Ok(format!("{JOURNAL_PATH}/{action}/{}", urlencoding::encode(id)))
}

fn journal_get_endpoint(id: &str) -> Result<String, ApiError> {
    journal_endpoint("get-by-id", id)
}

fn journal_update_endpoint(id: &str) -> Result<String, ApiError> {
    journal_endpoint("id", id)
}

fn journal_delete_endpoint(id: &str) -> Result<String, ApiError> {
    journal_endpoint("delete", id)
}

// =============================================================================
// PUBLIC
// =============================================================================

/// Register a new account via `POST /public/create-user`.
///
/// # Errors
///
/// Returns the backend's rejection, e.g. a taken user name.
pub async fn register(transport: &Transport, user: &User) -> Result<(), ApiError> {
    transport.send(Method::POST, REGISTER_PATH, Some(user)).await?;
    Ok(())
}

// =============================================================================
// USER
// =============================================================================

/// Fetch the greeting text from `GET /user`.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] if the credential is no longer accepted.
pub async fn greeting(transport: &Transport) -> Result<String, ApiError> {
    let reply = transport.send_empty(Method::GET, IDENTITY_PATH).await?;
    Ok(reply.body)
}

/// Update the signed-in user's profile via `PUT /user`.
///
/// # Errors
///
/// Returns the transport or status error.
pub async fn update_user(transport: &Transport, user: &User) -> Result<(), ApiError> {
    transport.send(Method::PUT, IDENTITY_PATH, Some(user)).await?;
    Ok(())
}

/// Delete the signed-in user's account via `DELETE /user`.
///
/// # Errors
///
/// Returns the transport or status error.
pub async fn delete_user(transport: &Transport) -> Result<(), ApiError> {
    transport.send_empty(Method::DELETE, IDENTITY_PATH).await?;
    Ok(())
}

// =============================================================================
// JOURNAL
// =============================================================================

/// # Errors
///
/// Returns the transport or status error, or [`ApiError::Decode`] on a malformed list.
pub async fn list_entries(transport: &Transport) -> Result<Vec<JournalEntry>, ApiError> {
    let reply = transport.send_empty(Method::GET, JOURNAL_PATH).await?;
    reply.json()
}

/// # Errors
///
/// Returns the transport or status error, or [`ApiError::Decode`] on a malformed entry.
pub async fn create_entry(transport: &Transport, entry: &JournalEntry) -> Result<JournalEntry, ApiError> {
    let reply = transport.send(Method::POST, JOURNAL_PATH, Some(entry)).await?;
    reply.json()
}

/// # Errors
///
/// Returns the transport or status error, or [`ApiError::Decode`] on a malformed entry.
pub async fn get_entry(transport: &Transport, id: &str) -> Result<JournalEntry, ApiError> {
    let reply = transport.send_empty(Method::GET, &journal_get_endpoint(id)?).await?;
    reply.json()
}

/// # Errors
///
/// Returns the transport or status error, or [`ApiError::Decode`] on a malformed entry.
pub async fn update_entry(transport: &Transport, id: &str, entry: &JournalEntry) -> Result<JournalEntry, ApiError> {
    let reply = transport.send(Method::PUT, &journal_update_endpoint(id)?, Some(entry)).await?;
    reply.json()
}

/// # Errors
///
/// Returns the transport or status error.
pub async fn delete_entry(transport: &Transport, id: &str) -> Result<(), ApiError> {
    transport.send_empty(Method::DELETE, &journal_delete_endpoint(id)?).await?;
    Ok(())
}

// =============================================================================
// ADMIN
// =============================================================================

/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
pub async fn list_users(transport: &Transport) -> Result<Vec<User>, ApiError> {
    let reply = transport.send_empty(Method::GET, ADMIN_PROBE_PATH).await?;
    reply.json()
}

/// # Errors
///
/// Returns [`ApiError::Forbidden`] for non-admins.
pub async fn create_admin(transport: &Transport, user: &User) -> Result<(), ApiError> {
    transport.send(Method::POST, CREATE_ADMIN_PATH, Some(user)).await?;
    Ok(())
}
