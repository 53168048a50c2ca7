//! Job ad domain models and transformations from HiBob responses

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiError, ApiResult};
use crate::fields::extract_text;

pub const FIELD_ID: &str = "/jobAd/id";
pub const FIELD_TITLE: &str = "/jobAd/title";
pub const FIELD_LOCATION: &str = "/jobAd/location";
pub const FIELD_DEPARTMENT: &str = "/jobAd/department";
pub const FIELD_DESCRIPTION: &str = "/jobAd/description";
pub const FIELD_APPLY_URL: &str = "/jobAd/applyUrl";
pub const FIELD_EMPLOYMENT_TYPE: &str = "/jobAd/employmentType";
pub const FIELD_PUBLISHED_DATE: &str = "/jobAd/publishedDate";

/// Fields every search asks for.
pub const SEARCH_FIELDS: [&str; 3] = [FIELD_ID, FIELD_TITLE, FIELD_LOCATION];

/// Placeholder job ad that exists in every HiBob tenant and is never a real opening.
pub const PLACEHOLDER_JOB_AD_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Status the listing shows when the caller does not pick one.
pub const DEFAULT_STATUS: &str = "Published";

/// Keys under which a search response may wrap its entry list.
const ENVELOPE_KEYS: [&str; 3] = ["jobAds", "data", "results"];

/// Caller-side search filters.
///
/// Empty strings are treated like `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    /// Free text matched against the job ad, not an exact value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruiter_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Extra field paths to request on top of [`SEARCH_FIELDS`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl SearchQuery {
    /// Listing default: only published ads unless the caller chose a status.
    ///
    /// An explicit empty status stays empty and disables the filter.
    pub fn with_default_status(mut self) -> Self {
        if self.status.is_none() {
            self.status = Some(DEFAULT_STATUS.to_string());
        }
        self
    }

    /// Field id, operator and value of every non-empty filter, in a stable order.
    pub fn filters(&self) -> Vec<(String, &'static str, String)> {
        [
            ("department", "equals", &self.department),
            ("employmentType", "equals", &self.employment_type),
            ("keywords", "contains", &self.keywords),
            ("location", "equals", &self.location),
            ("recruiterEmail", "equals", &self.recruiter_email),
            ("siteId", "equals", &self.site_id),
            ("status", "equals", &self.status),
        ]
        .into_iter()
        .filter_map(|(name, operator, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| (format!("/jobAd/{name}"), operator, value.to_string()))
        })
        .collect()
    }

    /// JSON body for `POST hiring/job-ads/search`.
    ///
    /// The fixed fields and the placeholder exclusion are always present; caller
    /// fields and filters are appended after them.
    pub fn to_body(&self) -> Value {
        let mut fields: Vec<String> = SEARCH_FIELDS.iter().map(|f| f.to_string()).collect();
        for field in &self.fields {
            let field = field.trim();
            if !field.is_empty() && !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }

        let mut filters = vec![json!({
            "fieldId": FIELD_ID,
            "operator": "notEquals",
            "values": [PLACEHOLDER_JOB_AD_ID],
        })];
        filters.extend(self.filters().into_iter().map(|(field_id, operator, value)| {
            json!({
                "fieldId": field_id,
                "operator": operator,
                "values": [value],
            })
        }));

        json!({ "fields": fields, "filters": filters })
    }
}

/// Minimal job shape needed for a listing card.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct JobSummary {
    pub id: String,
    pub title: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
}

/// Everything the detail page shows.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct JobDetail {
    pub id: String,
    pub title: Option<String>,
    /// Rich text (HTML) as sent by HiBob, not yet sanitised.
    pub description: Option<String>,
    pub apply_url: Option<String>,
    pub location: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub published_date: Option<String>,
}

/// Locate the entry list inside a decoded search response.
///
/// A bare array is the list itself. Objects may wrap it under `jobAds`, `data`
/// or `results`; an object without any of them carries no entries.
pub fn search_entries(response: Value) -> ApiResult<Vec<Value>> {
    match response {
        Value::Array(entries) => Ok(entries),
        Value::Object(mut map) => {
            for key in ENVELOPE_KEYS {
                match map.remove(key) {
                    Some(Value::Array(entries)) => return Ok(entries),
                    Some(Value::Null) | None => {}
                    Some(_) => return Err(unexpected_shape("search entry list is not an array")),
                }
            }
            Ok(Vec::new())
        }
        _ => Err(unexpected_shape("expected a JSON array of job ads")),
    }
}

fn unexpected_shape(message: &str) -> ApiError {
    ApiError::Decode {
        status: 200,
        message: message.to_string(),
    }
}

/// Normalise a search entry, or `None` when it has no id.
pub fn summarize(record: &Value) -> Option<JobSummary> {
    Some(JobSummary {
        id: extract_text(record, FIELD_ID, Some("id"))?,
        title: extract_text(record, FIELD_TITLE, Some("title")),
        location: extract_text(record, FIELD_LOCATION, Some("location")),
        department: extract_text(record, FIELD_DEPARTMENT, Some("department")),
    })
}

/// Normalise a job ad detail response, or `None` when it has no id.
pub fn detail(record: &Value) -> Option<JobDetail> {
    Some(JobDetail {
        id: extract_text(record, FIELD_ID, Some("id"))?,
        title: extract_text(record, FIELD_TITLE, Some("title")),
        description: extract_text(record, FIELD_DESCRIPTION, Some("description")),
        apply_url: extract_text(record, FIELD_APPLY_URL, Some("applyUrl"))
            .or_else(|| extract_text(record, FIELD_APPLY_URL, Some("applicationUrl"))),
        location: extract_text(record, FIELD_LOCATION, Some("location")),
        department: extract_text(record, FIELD_DEPARTMENT, Some("department")),
        employment_type: extract_text(record, FIELD_EMPLOYMENT_TYPE, Some("employmentType")),
        published_date: extract_text(record, FIELD_PUBLISHED_DATE, Some("publishedDate")),
    })
}
