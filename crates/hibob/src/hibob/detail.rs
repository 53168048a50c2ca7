use chrono::{DateTime, Utc};
use hibob_jobs_core::jobs;
use hibob_jobs_core::notice::{Block, Notice};
use hibob_jobs_core::render::{render_detail, DetailView, Fragment};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{ApiClient, HibobConfig};
use crate::prelude::*;
use crate::prelude::println;

/// Options for rendering the job detail block
#[derive(Debug, clap::Args, Serialize, Deserialize, Clone)]
pub struct DetailOptions {
    /// Job ad id (the `job_id` query parameter on a details page)
    #[arg(long = "job-id", env = "HIBOB_JOB_ID")]
    pub job_id: Option<String>,

    /// Output the view model as JSON
    #[arg(long)]
    pub json: bool,
}

/// What the detail block shows
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum DetailOutput {
    Job(DetailView),
    Notice(Notice),
}

impl DetailOutput {
    pub fn into_fragment(self) -> Fragment {
        match self {
            DetailOutput::Job(view) => Fragment {
                html: render_detail(&view),
                is_error: false,
            },
            DetailOutput::Notice(notice) => Fragment::notice(&notice, Block::Detail),
        }
    }
}

/// Public data function - used by both CLI and the embedding server
///
/// `now` anchors the "posted X ago" text.
pub async fn detail_data(
    client: &ApiClient,
    job_id: Option<&str>,
    now: DateTime<Utc>,
) -> DetailOutput {
    let Some(job_id) = job_id.map(str::trim).filter(|id| !id.is_empty()) else {
        info!("Job detail requested without a job id");
        return DetailOutput::Notice(Notice::MissingJobId);
    };

    let language = &client.config().language;
    let record = match client.get_detail(language, job_id).await {
        Ok(record) => record,
        Err(error) => {
            let notice = Notice::from_api_error(Block::Detail, &error);
            info!("Job detail {job_id} failed ({}): {error}", notice.class());
            return DetailOutput::Notice(notice);
        }
    };

    match jobs::detail(&record) {
        Some(job) => DetailOutput::Job(DetailView::new(job, now)),
        None => {
            warn!("Job ad {job_id} response has no id: {record}");
            DetailOutput::Notice(Notice::Incomplete)
        }
    }
}

/// Handle the detail command
pub async fn handler(options: DetailOptions, config: HibobConfig) -> Result<()> {
    let client = ApiClient::new(config)?;
    let output = detail_data(&client, options.job_id.as_deref(), Utc::now()).await;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.into_fragment().html);
    }

    Ok(())
}
