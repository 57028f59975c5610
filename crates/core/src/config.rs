//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the client and the web layer. Request handling never reads process-wide
//! environment variables, which keeps behaviour consistent across threads and test harnesses.

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_API_TIMEOUT_SECS, DEFAULT_SITE_URL, DEFAULT_STORAGE_URL,
    MAX_API_TIMEOUT_SECS,
};
use crate::{PortalError, PortalResult};
use std::time::Duration;

/// Portal configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortalConfig {
    api_base_url: String,
    site_url: String,
    storage_url: String,
    api_timeout: Duration,
}

impl PortalConfig {
    /// Create a new `PortalConfig`.
    ///
    /// Both URLs must be absolute `http`/`https` URLs; a trailing `/` is removed so paths can be
    /// appended with a single separator.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if either URL is empty or has an unsupported scheme.
    pub fn new(api_base_url: &str, site_url: &str, api_timeout: Duration) -> PortalResult<Self> {
        Ok(Self {
            api_base_url: normalise_base_url("api base url", api_base_url)?,
            site_url: normalise_base_url("site url", site_url)?,
            storage_url: DEFAULT_STORAGE_URL.into(),
            api_timeout,
        })
    }

    /// Override the origin that relative image paths are resolved against.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` for an empty or non-http(s) URL.
    pub fn with_storage_url(mut self, storage_url: &str) -> PortalResult<Self> {
        self.storage_url = normalise_base_url("storage url", storage_url)?;
        Ok(self)
    }

    /// Configuration pointing at the local development API.
    pub fn local() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            site_url: DEFAULT_SITE_URL.into(),
            storage_url: DEFAULT_STORAGE_URL.into(),
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
        }
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn storage_url(&self) -> &str {
        &self.storage_url
    }

    pub fn api_timeout(&self) -> Duration {
        self.api_timeout
    }
}

fn normalise_base_url(label: &str, value: &str) -> PortalResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PortalError::InvalidInput(format!("{label} cannot be empty")));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(PortalError::InvalidInput(format!(
            "{label} must start with http:// or https:// (got {value})"
        )));
    }
    Ok(value.trim_end_matches('/').to_string())
}

/// Parse the API timeout from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default timeout.
pub fn api_timeout_from_env_value(value: Option<String>) -> PortalResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS));
    };

    let secs: u64 = value.parse().map_err(|_| {
        PortalError::InvalidInput(format!("PORTAL_API_TIMEOUT_SECS is not a number: {value}"))
    })?;

    if secs == 0 || secs > MAX_API_TIMEOUT_SECS {
        return Err(PortalError::InvalidInput(format!(
            "PORTAL_API_TIMEOUT_SECS must be between 1 and {MAX_API_TIMEOUT_SECS}"
        )));
    }

    Ok(Duration::from_secs(secs))
}
