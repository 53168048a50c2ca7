use hibob_jobs_core::jobs::SearchQuery;
use hibob_jobs_core::notice::{Block, Notice};
use hibob_jobs_core::pagination::{coerce_limit, coerce_offset};
use hibob_jobs_core::render::{render_listing, validate_details_page, Fragment, ListingView};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{ApiClient, HibobConfig};
use crate::prelude::*;
use crate::prelude::println;

/// Options for rendering the job listing block
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone, Default)]
#[command(after_help = "EXAMPLES:
  # Render the first page of published jobs:
  hibob-jobs listing --details-page https://example.com/careers/job

  # Second page of 5, only Engineering:
  hibob-jobs listing --details-page /careers/job --limit 5 --offset 5 --department Engineering

  # Inspect the view model instead of the HTML:
  hibob-jobs listing --details-page /careers/job --json

NOTES:
  - Credentials come from HIBOB_SERVICE_USER_ID and HIBOB_SERVICE_USER_TOKEN
  - The \"next\" link appears whenever a page is full, so the last page of an
    exact multiple of --limit still shows one")]
pub struct ListingOptions {
    /// URL of the page that renders the job detail block
    #[arg(long = "details-page", env = "HIBOB_DETAILS_PAGE")]
    pub details_page: Option<String>,

    /// Number of jobs per page
    #[arg(short, long)]
    pub limit: Option<String>,

    /// Number of jobs to skip
    #[arg(short, long)]
    pub offset: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Output the view model as JSON
    #[arg(long)]
    pub json: bool,
}

/// Search filters, all optional
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone, Default)]
pub struct FilterArgs {
    /// Only jobs in this department
    #[arg(long)]
    pub department: Option<String>,

    /// Only jobs with this employment type
    #[arg(long)]
    pub employment_type: Option<String>,

    /// Free-text search over the job ad
    #[arg(long)]
    pub keywords: Option<String>,

    /// Only jobs at this location
    #[arg(long)]
    pub location: Option<String>,

    /// Only jobs owned by this recruiter
    #[arg(long)]
    pub recruiter_email: Option<String>,

    /// Only jobs for this site
    #[arg(long)]
    pub site_id: Option<String>,

    /// Only jobs with this status. Defaults to "Published"; pass "" to show every status
    #[arg(long)]
    pub status: Option<String>,
}

impl From<FilterArgs> for SearchQuery {
    fn from(args: FilterArgs) -> Self {
        SearchQuery {
            department: args.department,
            employment_type: args.employment_type,
            keywords: args.keywords,
            location: args.location,
            recruiter_email: args.recruiter_email,
            site_id: args.site_id,
            status: args.status,
            fields: Vec::new(),
        }
    }
}

/// Inputs of one listing render, as raw as they arrive from the host
#[derive(Debug, Clone, Default)]
pub struct ListingRequest {
    pub details_page: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub query: SearchQuery,
    /// URL of the page hosting the listing, used for pagination links
    pub listing_url: String,
}

/// What the listing block shows
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ListingOutput {
    Jobs(ListingView),
    Notice(Notice),
}

impl ListingOutput {
    pub fn into_fragment(self) -> Fragment {
        match self {
            ListingOutput::Jobs(view) => Fragment {
                html: render_listing(&view),
                is_error: false,
            },
            ListingOutput::Notice(notice) => Fragment::notice(&notice, Block::Listing),
        }
    }
}

/// Public data function - used by both CLI and the embedding server
///
/// Never fails: every problem becomes a [`Notice`].
pub async fn listing_data(client: &ApiClient, request: ListingRequest) -> ListingOutput {
    let details_page = match validate_details_page(request.details_page.as_deref()) {
        Ok(url) => url,
        Err(notice) => {
            warn!("Listing block misconfigured: {}", notice.message(Block::Listing));
            return ListingOutput::Notice(notice);
        }
    };

    let limit = coerce_limit(request.limit.as_deref());
    let offset = coerce_offset(request.offset.as_deref());

    let query = request.query.clone().with_default_status();
    let language = &client.config().language;
    let entries = match client.search(language, &query).await {
        Ok(entries) => entries,
        Err(error) => {
            let notice = Notice::from_api_error(Block::Listing, &error);
            info!("Job listing failed ({}): {error}", notice.class());
            return ListingOutput::Notice(notice);
        }
    };

    if entries.is_empty() {
        info!("Job search returned no entries");
        return ListingOutput::Notice(Notice::NoResults);
    }

    let view = ListingView::build(&entries, limit, offset, &details_page, &request.listing_url);
    for position in &view.skipped {
        warn!(
            "Skipping job ad without an id at position {}",
            offset + position
        );
    }

    ListingOutput::Jobs(view)
}

/// Handle the listing command
pub async fn handler(options: ListingOptions, config: HibobConfig) -> Result<()> {
    let client = ApiClient::new(config)?;

    let request = ListingRequest {
        details_page: options.details_page,
        limit: options.limit,
        offset: options.offset,
        query: options.filters.into(),
        listing_url: String::new(),
    };

    let output = listing_data(&client, request).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.into_fragment().html);
    }

    Ok(())
}
