//! The shared request pipeline every backend call goes through.
//!
//! ARCHITECTURE
//! ============
//! Outbound: the current credential is read from the session context (never
//! from the persisted store) and attached as `Authorization: Basic ...`.
//! Requests made while anonymous go out without the header.
//!
//! Inbound: a 401 expires the session that sent the request and moves the
//! view to login unless it is already there. Every other status is handed
//! back to the caller untouched. A request that gets no response at all is a
//! network error and leaves the session alone.
//!
//! Login probes use [`IdentityProbe`], which attaches an explicit candidate
//! credential and skips the inbound rejection stage.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::credential::Credential;
use super::error::{self, ApiError};
use super::probe::IdentityProbe;
use crate::config::{Timeouts, normalize_api_url};
use crate::state::navigation::Navigator;
use crate::state::session::SessionContext;

pub const IDENTITY_PATH: &str = "/user";
pub const ADMIN_PROBE_PATH: &str = "/admin/all-users";

/// A 2xx response body.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: String,
}

impl Reply {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

pub struct Transport {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
    navigator: Arc<Navigator>,
}

impl Transport {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        timeouts: Timeouts,
        session: Arc<SessionContext>,
        navigator: Arc<Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: normalize_api_url(base_url), session, navigator })
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request with the session's current credential.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] on 401 (the session has been expired)
    /// - [`ApiError::Forbidden`] on 403, or 404 under `/admin/`
    /// - [`ApiError::Status`] on any other non-2xx status
    /// - [`ApiError::Network`] if no response arrived
    pub async fn send<B: Serialize + ?Sized>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Reply, ApiError> {
        let credential = self.session.credential();
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(credential) = &credential {
            request = request.header(AUTHORIZATION, credential.header_value());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::from_reqwest(&e))?;
        let status = response.status();
        tracing::debug!(%method, path, status = status.as_u16(), authenticated = credential.is_some(), "backend response");

        if status == StatusCode::UNAUTHORIZED {
            self.reject(credential.as_ref());
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.map_err(|e| ApiError::from_reqwest(&e))?;
        if !status.is_success() {
            return Err(error::rejection(path, status.as_u16(), body));
        }
        Ok(Reply { status, body })
    }

    /// `send` without a body.
    ///
    /// # Errors
    ///
    /// See [`Transport::send`].
    pub async fn send_empty(&self, method: Method, path: &str) -> Result<Reply, ApiError> {
        self.send::<()>(method, path, None).await
    }

    /// Inbound rejection stage. Repeated 401s collapse into one transition.
    fn reject(&self, sent_with: Option<&Credential>) {
        let expired = self.session.expire(sent_with);
        if expired || !self.session.is_authenticated() {
            self.navigator.redirect_to_login();
        }
    }

    async fn probe(&self, path: &str, credential: &Credential) -> Result<(), ApiError> {
        let response = self
            .http
            .get(self.url(path))
            .header(AUTHORIZATION, credential.header_value())
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "identity probe");
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(error::rejection(path, status.as_u16(), body))
    }
}

#[async_trait::async_trait]
impl IdentityProbe for Transport {
    async fn verify(&self, credential: &Credential) -> Result<(), ApiError> {
        self.probe(IDENTITY_PATH, credential).await
    }

    async fn probe_admin(&self, credential: &Credential) -> Result<(), ApiError> {
        self.probe(ADMIN_PROBE_PATH, credential).await
    }
}
