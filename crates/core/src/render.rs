//! View models and HTML fragments for the listing and detail blocks
//!
//! Fragments are meant to be embedded in a host page, so they are bare markup
//! without `<html>`/`<body>`. Hosts must serve them with [`CACHE_CONTROL`]:
//! job ads change underneath us and a cached listing quickly shows closed
//! positions.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Serialize;
use serde_json::Value;

use crate::jobs::{summarize, JobDetail, JobSummary};
use crate::notice::{Block, Notice};
use crate::pagination::{with_query_param, PageLinks, PageState};
use crate::posted::posted_ago;
use crate::rich_text::sanitize_rich_text;

/// `Cache-Control` value for every fragment.
pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate, max-age=0";

/// `Pragma` value for HTTP/1.0 intermediaries.
pub const PRAGMA: &str = "no-cache";

/// Query parameter that carries the job id to the detail page.
pub const JOB_ID_PARAM: &str = "job_id";

const NOT_AVAILABLE: &str = "N/A";

/// A rendered block.
///
/// Always non-cacheable; see [`CACHE_CONTROL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub html: String,
    /// Set when the fragment reports an error state.
    pub is_error: bool,
}

impl Fragment {
    pub fn cache_control(&self) -> &'static str {
        CACHE_CONTROL
    }

    pub fn notice(notice: &Notice, block: Block) -> Self {
        Self {
            html: render_notice(notice, block),
            is_error: notice.is_error(),
        }
    }
}

/// A single listing card.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub location: Option<String>,
    pub department: Option<String>,
    pub url: String,
}

impl JobCard {
    pub fn new(job: JobSummary, details_page: &str) -> Self {
        let url = with_query_param(details_page, JOB_ID_PARAM, &job.id);
        Self {
            id: job.id,
            title: job.title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            location: job.location,
            department: job.department,
            url,
        }
    }
}

/// Everything the listing block renders.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ListingView {
    pub cards: Vec<JobCard>,
    pub page: PageState,
    pub links: PageLinks,
    /// Positions (within the page) of entries dropped for lacking an id.
    pub skipped: Vec<usize>,
}

impl ListingView {
    /// Build the listing for one page of search entries.
    ///
    /// `entries` is the full result set; the page is `[offset, offset + limit)`.
    /// Card links point at `details_page`, pagination links at `listing_url`.
    pub fn build(
        entries: &[Value],
        limit: usize,
        offset: usize,
        details_page: &str,
        listing_url: &str,
    ) -> Self {
        let window: Vec<&Value> = entries.iter().skip(offset).take(limit).collect();
        let page = PageState::new(limit, offset, window.len());

        let mut cards = Vec::with_capacity(window.len());
        let mut skipped = Vec::new();
        for (position, entry) in window.into_iter().enumerate() {
            match summarize(entry) {
                Some(job) => cards.push(JobCard::new(job, details_page)),
                None => skipped.push(position),
            }
        }

        Self {
            cards,
            page,
            links: page.links(listing_url),
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// Everything the detail block renders.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    /// Employment type and location combined into one tag.
    pub meta: Option<String>,
    pub department: Option<String>,
    /// "3 days ago", or empty when the published date is missing or unparseable.
    pub posted_ago: String,
    /// Sanitised description markup.
    pub description_html: Option<String>,
    pub apply_url: Option<String>,
}

impl DetailView {
    pub fn new(job: JobDetail, now: DateTime<Utc>) -> Self {
        Self {
            meta: meta_tag(job.employment_type.as_deref(), job.location.as_deref()),
            posted_ago: job
                .published_date
                .as_deref()
                .map(|date| posted_ago(date, now))
                .unwrap_or_default(),
            description_html: job
                .description
                .as_deref()
                .map(sanitize_rich_text)
                .filter(|html| !html.trim().is_empty()),
            apply_url: job.apply_url.filter(|url| is_http_url(url)),
            id: job.id,
            title: job.title.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            department: job.department,
        }
    }
}

/// Combine employment type and location, dropping the duplicate when they match.
pub fn meta_tag(employment_type: Option<&str>, location: Option<&str>) -> Option<String> {
    match (employment_type, location) {
        (Some(kind), Some(place)) if kind.to_lowercase() == place.to_lowercase() => {
            Some(kind.to_string())
        }
        (Some(kind), Some(place)) => Some(format!("{kind} · {place}")),
        (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
        (None, None) => None,
    }
}

/// Check the detail page URL the listing block links to.
///
/// Accepts absolute http(s) URLs and root-relative paths.
pub fn validate_details_page(raw: Option<&str>) -> Result<String, Notice> {
    let url = raw.map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(Notice::ConfigurationError(
            "The \"job_details_page\" parameter is missing. Please provide the URL of your job details page."
                .to_string(),
        ));
    }

    if !is_page_url(url) {
        return Err(Notice::ConfigurationError(format!(
            "The \"job_details_page\" parameter is not a valid URL: {url}"
        )));
    }

    Ok(url.to_string())
}

/// True for absolute http(s) URLs and root-relative paths that are safe to put
/// in an `href`.
pub fn is_page_url(url: &str) -> bool {
    let has_bad_chars = url
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '`'));
    let valid_shape = is_http_url(url) || (url.starts_with('/') && !url.starts_with("//"));
    !has_bad_chars && valid_shape
}

fn is_http_url(url: &str) -> bool {
    let lower = url.trim().to_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}

pub fn render_notice(notice: &Notice, block: Block) -> String {
    let css = if notice.is_error() {
        format!("hibob-error hibob-error--{}", notice.class())
    } else {
        "hibob-no-jobs".to_string()
    };
    format!(
        "<p class=\"{css}\">{}</p>",
        encode_text(&notice.message(block))
    )
}

pub fn render_listing(view: &ListingView) -> String {
    let mut html = String::from("<div class=\"hibob-job-listings-container\">\n");

    if view.is_empty() {
        html.push_str(&render_notice(&Notice::NoResults, Block::Listing));
        html.push('\n');
    } else {
        html.push_str("<ul class=\"hibob-job-list\">\n");
        for card in &view.cards {
            html.push_str(&render_card(card));
        }
        html.push_str("</ul>\n");
    }

    if !view.links.is_empty() {
        html.push_str("<nav class=\"hibob-pagination\">\n");
        if let Some(previous) = &view.links.previous {
            html.push_str(&format!(
                "<a class=\"hibob-pagination__previous\" href=\"{}\">« Previous</a>\n",
                encode_double_quoted_attribute(previous)
            ));
        }
        if let Some(next) = &view.links.next {
            html.push_str(&format!(
                "<a class=\"hibob-pagination__next\" href=\"{}\">Next »</a>\n",
                encode_double_quoted_attribute(next)
            ));
        }
        html.push_str("</nav>\n");
    }

    html.push_str("</div>\n");
    html
}

fn render_card(card: &JobCard) -> String {
    let mut html = String::from("<li class=\"hibob-job-item\">\n");
    html.push_str(&format!(
        "<h3 class=\"hibob-job-title\">{}</h3>\n",
        encode_text(&card.title)
    ));

    let meta: Vec<String> = [
        ("Department", card.department.as_deref()),
        ("Location", card.location.as_deref()),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value.map(|v| format!("<strong>{label}:</strong> {}", encode_text(v)))
    })
    .collect();
    if !meta.is_empty() {
        html.push_str(&format!(
            "<p class=\"hibob-job-meta\">{}</p>\n",
            meta.join("<br>")
        ));
    }

    html.push_str(&format!(
        "<a href=\"{}\" class=\"hibob-job-details-link button\">View Job Details</a>\n",
        encode_double_quoted_attribute(&card.url)
    ));
    html.push_str("</li>\n");
    html
}

pub fn render_detail(view: &DetailView) -> String {
    let mut html = String::from("<div class=\"hibob-job-details-container\">\n");
    html.push_str(&format!(
        "<h1 class=\"hibob-job-detail-title\">{}</h1>\n",
        encode_text(&view.title)
    ));

    html.push_str("<div class=\"hibob-job-detail-meta\">\n");
    if let Some(meta) = &view.meta {
        html.push_str(&format!(
            "<span class=\"hibob-job-tag\">{}</span>\n",
            encode_text(meta)
        ));
    }
    if let Some(department) = &view.department {
        html.push_str(&format!(
            "<span class=\"hibob-job-department\">{}</span>\n",
            encode_text(department)
        ));
    }
    if !view.posted_ago.is_empty() {
        html.push_str(&format!(
            "<span class=\"hibob-job-posted\">Posted {}</span>\n",
            encode_text(&view.posted_ago)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"hibob-job-detail-description\">\n");
    match &view.description_html {
        Some(description) => {
            html.push_str(description);
            html.push('\n');
        }
        None => html.push_str("<p>No description available.</p>\n"),
    }
    html.push_str("</div>\n");

    if let Some(apply_url) = &view.apply_url {
        html.push_str(&format!(
            "<p class=\"hibob-apply-now\"><a href=\"{}\" class=\"button button-primary\" target=\"_blank\" rel=\"noopener noreferrer\">Apply Now</a></p>\n",
            encode_double_quoted_attribute(apply_url)
        ));
    }

    html.push_str("</div>\n");
    html
}
