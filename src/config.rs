//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const SESSION_DIR_NAME: &str = ".moodlog";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither `MOODLOG_SESSION_DIR` nor `HOME` is set.
    #[error("no session directory: set MOODLOG_SESSION_DIR or HOME")]
    MissingSessionDir,

    /// A numeric variable held something that is not a number.
    #[error("config parse failed: {var}={value}")]
    Parse { var: &'static str, value: String },
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingSessionDir => "E_MISSING_SESSION_DIR",
            Self::Parse { .. } => "E_CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    /// `MOODLOG_REQUEST_TIMEOUT_SECS` / `MOODLOG_CONNECT_TIMEOUT_SECS`, defaulting when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is set but not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            request_secs: env_parse_u64("MOODLOG_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("MOODLOG_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        })
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub session_dir: PathBuf,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `MOODLOG_API_URL`: backend base URL, default `http://localhost:8080`
    /// - `MOODLOG_SESSION_DIR`: persisted session directory, default `$HOME/.moodlog`
    /// - `MOODLOG_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MOODLOG_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if no session directory can be derived or a timeout is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(None, None)
    }

    /// Like [`ClientConfig::from_env`], but explicit values (e.g. CLI flags)
    /// win over `MOODLOG_API_URL` and `MOODLOG_SESSION_DIR`. With an explicit
    /// session directory `HOME` is not needed. Timeouts always come from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no session directory can be derived or a timeout is not a number.
    pub fn from_env_with(api_url: Option<&str>, session_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        let api_url = match api_url {
            Some(url) => normalize_api_url(url),
            None => normalize_api_url(&std::env::var("MOODLOG_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned())),
        };
        let session_dir = match session_dir {
            Some(dir) => dir,
            None => session_dir_from(
                std::env::var("MOODLOG_SESSION_DIR").ok().as_deref(),
                std::env::var("HOME").ok().as_deref(),
            )?,
        };
        let timeouts = Timeouts::from_env()?;
        Ok(Self { api_url, session_dir, timeouts })
    }

    /// Config pointing at `api_url` with the given session directory and default timeouts.
    #[must_use]
    pub fn new(api_url: &str, session_dir: impl Into<PathBuf>) -> Self {
        Self { api_url: normalize_api_url(api_url), session_dir: session_dir.into(), timeouts: Timeouts::default() }
    }
}

pub(crate) fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn session_dir_from(explicit: Option<&str>, home: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = explicit.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    match home.filter(|h| !h.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join(SESSION_DIR_NAME)),
        None => Err(ConfigError::MissingSessionDir),
    }
}

fn env_parse_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse::<u64>().map_err(|_| ConfigError::Parse { var, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
