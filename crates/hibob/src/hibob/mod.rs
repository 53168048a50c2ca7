use hibob_jobs_core::api::Credentials;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use std::time::Duration;

use crate::prelude::*;

pub mod client;
pub mod detail;
pub mod listing;

#[cfg(test)]
pub(crate) mod mock;

pub use client::ApiClient;

/// Connect and read timeout for every HiBob call. There are no retries.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HiBob configuration, passed to [`ApiClient::new`]
#[derive(Debug, Clone)]
pub struct HibobConfig {
    pub base_url: String,
    pub credentials: Credentials,
    /// Sent as `preferredLanguage` on every call
    pub language: String,
}

impl HibobConfig {
    /// Default HiBob API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://api.hibob.com/v1";

    pub const DEFAULT_LANGUAGE: &'static str = "en";

    /// Load configuration from environment variables
    ///
    /// Missing credentials load as empty strings; the client reports them as
    /// `CredentialsMissing` when a request is attempted.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("HIBOB_API_BASE_URL")
                .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string()),
            credentials: Credentials::new(
                std::env::var("HIBOB_SERVICE_USER_ID").unwrap_or_default(),
                std::env::var("HIBOB_SERVICE_USER_TOKEN").unwrap_or_default(),
            ),
            language: std::env::var("HIBOB_LANGUAGE")
                .unwrap_or_else(|_| Self::DEFAULT_LANGUAGE.to_string()),
        }
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(mut self, base_url: Option<String>, language: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        if let Some(language) = language {
            self.language = language;
        }
        self
    }

    /// Reject base URLs reqwest would fail on at request time
    pub fn validate(&self) -> std::result::Result<(), Error> {
        let base = self.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::Config(format!(
                "HiBob base URL must start with http:// or https://, got '{base}'"
            )));
        }
        Ok(())
    }
}

/// Create the HTTP client used for HiBob calls
///
/// Credentials are not baked into the client; see [`basic_auth_header`].
pub fn create_http_client() -> std::result::Result<reqwest::Client, Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(REQUEST_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| Error::HttpClient(e.to_string()))
}

/// `Authorization: Basic base64(id:token)`
pub fn basic_auth_header(credentials: &Credentials) -> Result<HeaderValue> {
    use base64::Engine;

    let auth_string = format!(
        "{}:{}",
        credentials.service_user_id, credentials.service_user_token
    );
    let auth_encoded = base64::engine::general_purpose::STANDARD.encode(&auth_string);

    let mut value = HeaderValue::from_str(&format!("Basic {auth_encoded}"))
        .map_err(|e| eyre!("Invalid header value: {}", e))?;
    value.set_sensitive(true);
    Ok(value)
}
