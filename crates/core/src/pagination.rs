//! Listing pagination state and link building
//!
//! HiBob's search response carries no total count, so whether another page
//! exists is a guess: a full page suggests more entries may follow. This can
//! show a "next" link that leads to an empty page (when the total is an exact
//! multiple of the limit), so treat it as a navigation hint only.

use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_OFFSET: usize = 0;

pub const OFFSET_PARAM: &str = "offset";
pub const LIMIT_PARAM: &str = "limit";

/// Pagination state of a single listing render.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub limit: usize,
    pub offset: usize,
    /// Number of entries the page received, before dropping unusable ones.
    pub result_count: usize,
}

impl PageState {
    pub fn new(limit: usize, offset: usize, result_count: usize) -> Self {
        Self {
            limit,
            offset,
            result_count,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    /// Best-effort: true when the page came back full.
    pub fn has_next(&self) -> bool {
        self.limit > 0 && self.result_count == self.limit
    }

    pub fn previous_offset(&self) -> usize {
        self.offset.saturating_sub(self.limit)
    }

    pub fn next_offset(&self) -> usize {
        self.offset + self.limit
    }

    /// Links for the previous and next pages, relative to `page_url`.
    pub fn links(&self, page_url: &str) -> PageLinks {
        PageLinks {
            previous: self
                .has_previous()
                .then(|| page_link(page_url, self.previous_offset(), self.limit)),
            next: self
                .has_next()
                .then(|| page_link(page_url, self.next_offset(), self.limit)),
        }
    }
}

/// Rendered pagination controls. `None` means the control is hidden.
#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}

fn page_link(page_url: &str, offset: usize, limit: usize) -> String {
    let url = with_query_param(page_url, OFFSET_PARAM, &offset.to_string());
    with_query_param(&url, LIMIT_PARAM, &limit.to_string())
}

/// Coerce a raw offset from the request context. Negative values clamp to 0.
pub fn coerce_offset(raw: Option<&str>) -> usize {
    raw.and_then(parse_signed)
        .map(|n| n.max(0) as usize)
        .unwrap_or(DEFAULT_OFFSET)
}

/// Coerce a raw limit. Zero, negative or unparsable values use the default.
pub fn coerce_limit(raw: Option<&str>) -> usize {
    match raw.and_then(parse_signed) {
        Some(n) if n > 0 => n as usize,
        _ => DEFAULT_LIMIT,
    }
}

fn parse_signed(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Set `key=value` on a URL's query string, replacing any existing `key`.
///
/// Keeps the fragment, if any, at the end.
pub fn with_query_param(url: &str, key: &str, value: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (url, None),
    };
    let (base, query) = match without_fragment.split_once('?') {
        Some((base, query)) => (base, query),
        None => (without_fragment, ""),
    };

    let mut pairs: Vec<String> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some(key))
        .map(str::to_string)
        .collect();
    pairs.push(format!(
        "{}={}",
        urlencoding::encode(key),
        urlencoding::encode(value)
    ));

    let mut result = format!("{base}?{}", pairs.join("&"));
    if let Some(fragment) = fragment {
        result.push('#');
        result.push_str(fragment);
    }
    result
}
