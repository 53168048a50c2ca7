//! Request model and error taxonomy for the HiBob hiring API
//!
//! Everything here is pure: requests are described as data and executed by the
//! shell, and failed responses are classified from `(status, body)` alone.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::jobs::SearchQuery;

/// Search endpoint, relative to the API base URL.
pub const SEARCH_ENDPOINT: &str = "hiring/job-ads/search";

/// Job ad endpoint prefix, relative to the API base URL.
pub const JOB_ADS_ENDPOINT: &str = "hiring/job-ads";

/// Query parameter carrying the language hint.
pub const LANGUAGE_PARAM: &str = "preferredLanguage";

/// Upper bound (exclusive) for body snippets used as error messages.
const MAX_SNIPPET_CHARS: usize = 500;

const NO_MESSAGE: &str = "No error message provided by the API.";

/// Service user credentials for Basic authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub service_user_id: String,
    pub service_user_token: String,
}

impl Credentials {
    pub fn new(service_user_id: impl Into<String>, service_user_token: impl Into<String>) -> Self {
        Self {
            service_user_id: service_user_id.into(),
            service_user_token: service_user_token.into(),
        }
    }

    /// True iff both the id and the token are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.service_user_id.is_empty() && !self.service_user_token.is_empty()
    }
}

/// HTTP method used by the hiring API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// A request against the hiring API, built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    /// Path relative to the API base URL, without a leading slash.
    pub endpoint: String,
    pub method: Method,
    /// Query parameters in the order they are sent.
    pub query: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ApiRequest {
    /// `POST hiring/job-ads/search?preferredLanguage=<language>`
    pub fn search(query: &SearchQuery, language: &str) -> Self {
        Self {
            endpoint: SEARCH_ENDPOINT.to_string(),
            method: Method::Post,
            query: language_query(language),
            body: Some(query.to_body()),
        }
    }

    /// `GET hiring/job-ads/{id}?preferredLanguage=<language>`
    ///
    /// Fails with [`ApiError::InvalidInput`] when the id is blank.
    pub fn job_ad(job_id: &str, language: &str) -> ApiResult<Self> {
        let job_id = job_id.trim();
        if job_id.is_empty() {
            return Err(ApiError::InvalidInput("Job ID cannot be empty.".to_string()));
        }

        Ok(Self {
            endpoint: format!("{JOB_ADS_ENDPOINT}/{}", urlencoding::encode(job_id)),
            method: Method::Get,
            query: language_query(language),
            body: None,
        })
    }

    /// Join the endpoint onto a base URL, tolerating a trailing slash on the base.
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

fn language_query(language: &str) -> Vec<(String, String)> {
    let language = language.trim();
    if language.is_empty() {
        Vec::new()
    } else {
        vec![(LANGUAGE_PARAM.to_string(), language.to_string())]
    }
}

/// Discriminant of [`ApiError`], for callers that only branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    CredentialsMissing,
    InvalidInput,
    TransportError,
    DecodeError,
    ApiError,
}

/// Every expected failure of a hiring API call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("HiBob service user ID or token not configured.")]
    CredentialsMissing,

    #[error("{0}")]
    InvalidInput(String),

    #[error("API request failed: {0}")]
    Transport(String),

    #[error("Failed to decode API response: {message}")]
    Decode { status: u16, message: String },

    #[error("HiBob API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
        raw_body: String,
    },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::CredentialsMissing => ErrorKind::CredentialsMissing,
            ApiError::InvalidInput(_) => ErrorKind::InvalidInput,
            ApiError::Transport(_) => ErrorKind::TransportError,
            ApiError::Decode { .. } => ErrorKind::DecodeError,
            ApiError::Api { .. } => ErrorKind::ApiError,
        }
    }

    /// HTTP status of the response that produced the error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Decode { status, .. } | ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for missing credentials and for 401/403 responses.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::CredentialsMissing) || matches!(self.status(), Some(401 | 403))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Classify a raw HTTP exchange.
///
/// 2xx bodies must be valid JSON; anything else becomes [`ApiError::Api`] with
/// a message pulled from the body by [`extract_error_message`].
pub fn classify_response(status: u16, body: &str) -> ApiResult<Value> {
    if (200..300).contains(&status) {
        return serde_json::from_str(body).map_err(|e| ApiError::Decode {
            status,
            message: e.to_string(),
        });
    }

    Err(ApiError::Api {
        status,
        message: extract_error_message(body),
        raw_body: body.to_string(),
    })
}

/// Pull a human readable message out of an error response body.
///
/// Looks at `message`, then `error` (string or `{message}`), then a per-field
/// `errors` map. Without structured content, falls back to a tag-stripped
/// snippet of the body, or a generic message for HTML pages and empty bodies.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = structured_message(&value) {
            return message;
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || looks_like_html(trimmed) {
        return NO_MESSAGE.to_string();
    }

    let stripped = strip_tags(trimmed);
    if stripped.is_empty() {
        return NO_MESSAGE.to_string();
    }

    truncate_snippet(&stripped)
}

fn structured_message(value: &Value) -> Option<String> {
    if let Some(message) = non_empty_str(value.get("message")) {
        return Some(message);
    }

    match value.get("error") {
        Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
        Some(error @ Value::Object(_)) => {
            if let Some(message) = non_empty_str(error.get("message")) {
                return Some(message);
            }
        }
        _ => {}
    }

    let errors = value.get("errors")?.as_object()?;
    let parts: Vec<String> = errors
        .iter()
        .filter_map(|(field, detail)| {
            let text = match detail {
                Value::String(s) => s.trim().to_string(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", "),
                Value::Object(_) => non_empty_str(detail.get("message")).unwrap_or_default(),
                _ => String::new(),
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.chars().take(256).collect::<String>().to_lowercase();
    head.starts_with("<!doctype") || head.contains("<html") || head.contains("<body")
}

fn strip_tags(text: &str) -> String {
    let re = Regex::new(r"<[^>]*>").unwrap();
    let stripped = re.replace_all(text, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_snippet(text: &str) -> String {
    if text.chars().count() < MAX_SNIPPET_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_SNIPPET_CHARS - 4).collect();
    format!("{}...", cut.trim_end())
}
