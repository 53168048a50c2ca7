//! User-facing message classes for the listing and detail blocks
//!
//! A notice never carries a raw upstream body; API errors contribute only their
//! classified message.

use serde::Serialize;

use crate::api::ApiError;

/// Which block a failure happened in. Only the detail block knows "not found".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Listing,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "class", content = "message", rename_all = "kebab-case")]
pub enum Notice {
    CredentialsInvalid,
    NotFound,
    #[serde(rename = "generic-fetch-error")]
    FetchError(String),
    NoResults,
    ConfigurationError(String),
    MissingJobId,
    Incomplete,
}

impl Notice {
    /// Map an API failure to the notice shown in `block`.
    pub fn from_api_error(block: Block, error: &ApiError) -> Self {
        if error.is_unauthorized() {
            return Notice::CredentialsInvalid;
        }

        match (block, error) {
            (_, ApiError::InvalidInput(message)) => Notice::ConfigurationError(message.clone()),
            (Block::Detail, ApiError::Api { status: 404, .. }) => Notice::NotFound,
            (_, error) => Notice::FetchError(error.to_string()),
        }
    }

    /// Stable class name, also used as a CSS modifier.
    pub fn class(&self) -> &'static str {
        match self {
            Notice::CredentialsInvalid => "credentials-invalid",
            Notice::NotFound => "not-found",
            Notice::FetchError(_) => "generic-fetch-error",
            Notice::NoResults => "no-results",
            Notice::ConfigurationError(_) => "configuration-error",
            Notice::MissingJobId => "missing-job-id",
            Notice::Incomplete => "incomplete",
        }
    }

    /// Everything except "no results" is an error state.
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::NoResults)
    }

    pub fn message(&self, block: Block) -> String {
        match self {
            Notice::CredentialsInvalid => {
                "HiBob API credentials are invalid or not configured. Please check the service user configuration."
                    .to_string()
            }
            Notice::NotFound => "Job not found. It may have been filled or removed.".to_string(),
            Notice::FetchError(message) => match block {
                Block::Listing => format!("Error fetching job listings: {message}"),
                Block::Detail => format!("Error fetching job details: {message}"),
            },
            Notice::NoResults => "No job listings found matching your criteria.".to_string(),
            Notice::ConfigurationError(message) => format!("Error: {message}"),
            Notice::MissingJobId => {
                "No job ID specified. Please provide a job_id in the URL (e.g., ?job_id=123)."
                    .to_string()
            }
            Notice::Incomplete => "Job details not found or the response was empty.".to_string(),
        }
    }
}
