use crate::hibob::detail::detail_data;
use crate::hibob::listing::{listing_data, ListingRequest};
use crate::hibob::{ApiClient, HibobConfig};
use crate::prelude::*;
use crate::prelude::eprintln;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, PRAGMA, REFERER},
        HeaderMap, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use hibob_jobs_core::jobs::SearchQuery;
use hibob_jobs_core::notice::{Block, Notice};
use hibob_jobs_core::render::{self, is_page_url, Fragment};
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Serve fragments for a page that links to /careers/job for details:
  hibob-jobs serve --details-page https://example.com/careers/job

  # Fetch a fragment:
  curl 'http://127.0.0.1:3000/jobs?limit=5&department=Engineering'
  curl 'http://127.0.0.1:3000/jobs/detail?job_id=42'")]
pub struct ServeOptions {
    /// Port to listen on
    #[arg(long, default_value = "3000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// URL of the page that renders the job detail block
    #[arg(long = "details-page", env = "HIBOB_DETAILS_PAGE")]
    pub details_page: Option<String>,
}

/// Shared by every request; the client is built once.
pub struct ServerState {
    pub client: ApiClient,
    pub details_page: Option<String>,
}

/// Query string of `GET /jobs`
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub offset: Option<String>,
    pub limit: Option<String>,
    /// Overrides the server's configured details page
    pub job_details_page: Option<String>,
    /// Host page the listing is embedded in; pagination links point here
    pub page_url: Option<String>,
    pub department: Option<String>,
    pub employment_type: Option<String>,
    pub keywords: Option<String>,
    pub location: Option<String>,
    pub recruiter_email: Option<String>,
    pub site_id: Option<String>,
    pub status: Option<String>,
}

/// Query string of `GET /jobs/detail`
#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub job_id: Option<String>,
}

pub async fn run(options: ServeOptions, config: HibobConfig, verbose: bool) -> Result<()> {
    let client = ApiClient::new(config)?;
    if !client.has_credentials() {
        warn!("HiBob credentials are not configured; every block will report them as invalid");
    }

    let state = Arc::new(ServerState {
        client,
        details_page: options.details_page,
    });

    let addr = format!("{}:{}", options.host, options.port);

    if verbose {
        eprintln!("Serving job blocks on http://{}", addr);
        eprintln!("Listing endpoint: http://{}/jobs", addr);
        eprintln!("Detail endpoint: http://{}/jobs/detail?job_id=<id>", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| eyre!("Failed to bind to {}: {}", addr, e))?;

    info!("Listening on {addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| eyre!("Server error: {e}"))?;

    Ok(())
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/jobs", get(listing_handler))
        .route("/jobs/detail", get(detail_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(state)
}

async fn listing_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    uri: Uri,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return notice_response(query_rejected(&rejection), Block::Listing),
    };

    let listing_url = match listing_page_url(params.page_url.as_deref(), &headers, &uri) {
        Ok(url) => url,
        Err(notice) => return notice_response(notice, Block::Listing),
    };

    let request = ListingRequest {
        details_page: params
            .job_details_page
            .or_else(|| state.details_page.clone()),
        limit: params.limit,
        offset: params.offset,
        query: SearchQuery {
            department: params.department,
            employment_type: params.employment_type,
            keywords: params.keywords,
            location: params.location,
            recruiter_email: params.recruiter_email,
            site_id: params.site_id,
            status: params.status,
            fields: Vec::new(),
        },
        listing_url,
    };

    fragment_response(listing_data(&state.client, request).await.into_fragment())
}

async fn detail_handler(
    State(state): State<Arc<ServerState>>,
    params: Result<Query<DetailParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return notice_response(query_rejected(&rejection), Block::Detail),
    };

    let output = detail_data(&state.client, params.job_id.as_deref(), Utc::now()).await;
    fragment_response(output.into_fragment())
}

/// Base URL for pagination links: `page_url`, then the `Referer`, then the
/// fragment endpoint itself.
fn listing_page_url(
    page_url: Option<&str>,
    headers: &HeaderMap,
    uri: &Uri,
) -> std::result::Result<String, Notice> {
    if let Some(url) = page_url.map(str::trim).filter(|url| !url.is_empty()) {
        if !is_page_url(url) {
            return Err(Notice::ConfigurationError(format!(
                "The \"page_url\" parameter is not a valid URL: {url}"
            )));
        }
        return Ok(url.to_string());
    }

    let referer = headers
        .get(REFERER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|url| is_page_url(url));
    if let Some(url) = referer {
        return Ok(url.to_string());
    }

    debug!("No host page for {uri}; pagination links point at the fragment endpoint");
    Ok(uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string()))
}

fn query_rejected(rejection: &QueryRejection) -> Notice {
    warn!("Rejected query string: {}", rejection.body_text());
    Notice::ConfigurationError(format!("Invalid query string: {}", rejection.body_text()))
}

async fn health_handler() -> &'static str {
    "ok"
}

fn notice_response(notice: Notice, block: Block) -> Response {
    fragment_response(Fragment::notice(&notice, block))
}

/// Errors are part of the fragment, so the status is always 200.
fn fragment_response(fragment: Fragment) -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HTML_CONTENT_TYPE),
            (CACHE_CONTROL, fragment.cache_control()),
            (PRAGMA, render::PRAGMA),
        ],
        fragment.html,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hibob::mock::{self, MockUpstream};
    use hibob_jobs_core::api::Credentials;
    use tokio::net::TcpListener;

    async fn start_server(upstream: &MockUpstream, details_page: Option<&str>) -> String {
        let client = ApiClient::new(HibobConfig {
            base_url: upstream.base_url.clone(),
            credentials: Credentials::new("service-user", "token"),
            language: "en".to_string(),
        })
        .unwrap();
        let state = Arc::new(ServerState {
            client,
            details_page: details_page.map(str::to_string),
        });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router(state)).await });
        format!("http://{addr}")
    }

    fn assert_not_cacheable(response: &reqwest::Response) {
        let headers = response.headers();
        assert_eq!(
            headers.get(CACHE_CONTROL).unwrap(),
            "no-store, no-cache, must-revalidate, max-age=0"
        );
        assert_eq!(headers.get(PRAGMA).unwrap(), "no-cache");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), HTML_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_listing_fragment() {
        let entries: Vec<serde_json::Value> = (0..10)
            .map(|i| serde_json::json!({"/jobAd/id": {"value": i.to_string()}, "/jobAd/title": "Job"}))
            .collect();
        let upstream = mock::start(200, &serde_json::to_string(&entries).unwrap()).await;
        let server = start_server(&upstream, Some("/careers/job")).await;

        let response = reqwest::get(format!("{server}/jobs?limit=10&department=Engineering"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_not_cacheable(&response);

        let html = response.text().await.unwrap();
        assert!(html.contains("/careers/job?job_id=3"));
        assert!(html.contains("offset=10"));
        assert!(html.contains("department=Engineering"));

        let body: serde_json::Value =
            serde_json::from_str(&upstream.last_request().unwrap().body).unwrap();
        assert_eq!(body["filters"][1]["values"][0], "Engineering");
    }

    #[tokio::test]
    async fn test_query_details_page_overrides_configured_one() {
        let upstream = mock::start(200, r#"[{"id": "7", "title": "Chef"}]"#).await;
        let server = start_server(&upstream, None).await;

        let html = reqwest::get(format!(
            "{server}/jobs?job_details_page=https%3A%2F%2Fexample.com%2Fjob"
        ))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
        assert!(html.contains("https://example.com/job?job_id=7"));
    }

    #[tokio::test]
    async fn test_errors_are_200_fragments() {
        let upstream = mock::start(401, "").await;
        let server = start_server(&upstream, Some("/careers/job")).await;

        let response = reqwest::get(format!("{server}/jobs")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_not_cacheable(&response);
        assert!(response
            .text()
            .await
            .unwrap()
            .contains("hibob-error--credentials-invalid"));

        let response = reqwest::get(format!("{server}/jobs/detail")).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_not_cacheable(&response);
        assert!(response
            .text()
            .await
            .unwrap()
            .contains("hibob-error--missing-job-id"));
    }

    #[tokio::test]
    async fn test_detail_fragment() {
        let upstream = mock::start(
            200,
            r#"{"id": "42", "title": "Engineer", "applyUrl": "javascript:alert(1)"}"#,
        )
        .await;
        let server = start_server(&upstream, None).await;

        let response = reqwest::get(format!("{server}/jobs/detail?job_id=42"))
            .await
            .unwrap();
        assert_not_cacheable(&response);

        let html = response.text().await.unwrap();
        assert!(html.contains("Engineer"));
        assert!(!html.contains("Apply Now"));
        assert_eq!(upstream.last_request().unwrap().path, "/hiring/job-ads/42");
    }

    fn ten_entries() -> String {
        let entries: Vec<serde_json::Value> = (0..10)
            .map(|i| serde_json::json!({"id": i.to_string(), "title": "Job"}))
            .collect();
        serde_json::to_string(&entries).unwrap()
    }

    #[tokio::test]
    async fn test_pagination_links_point_at_page_url() {
        let upstream = mock::start(200, &ten_entries()).await;
        let server = start_server(&upstream, Some("/careers/job")).await;

        let html = reqwest::get(format!(
            "{server}/jobs?limit=10&page_url=https%3A%2F%2Fexample.com%2Fcareers%3Fteam%3Deng"
        ))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

        assert!(
            html.contains(r#"href="https://example.com/careers?team=eng&amp;offset=10&amp;limit=10""#),
            "{html}"
        );
        assert!(!html.contains("href=\"/jobs?"));
    }

    #[tokio::test]
    async fn test_pagination_links_fall_back_to_referer() {
        let upstream = mock::start(200, &ten_entries()).await;
        let server = start_server(&upstream, Some("/careers/job")).await;

        let html = reqwest::Client::new()
            .get(format!("{server}/jobs?limit=10"))
            .header(REFERER, "https://example.com/careers")
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(html.contains(r#"href="https://example.com/careers?offset=10&amp;limit=10""#));
    }

    #[tokio::test]
    async fn test_invalid_page_url_is_configuration_error() {
        let upstream = mock::start(200, &ten_entries()).await;
        let server = start_server(&upstream, Some("/careers/job")).await;

        let response = reqwest::get(format!("{server}/jobs?page_url=javascript%3Aalert(1)"))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_not_cacheable(&response);
        assert!(response
            .text()
            .await
            .unwrap()
            .contains("hibob-error--configuration-error"));
        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_malformed_query_is_error_fragment() {
        let upstream = mock::start(200, &ten_entries()).await;
        let server = start_server(&upstream, Some("/careers/job")).await;

        for path in ["/jobs?limit=10&limit=5", "/jobs/detail?job_id=1&job_id=2"] {
            let response = reqwest::get(format!("{server}{path}")).await.unwrap();
            assert_eq!(response.status(), 200, "{path}");
            assert_not_cacheable(&response);

            let html = response.text().await.unwrap();
            assert!(html.contains("hibob-error--configuration-error"), "{path}: {html}");
            assert!(html.contains("Invalid query string"), "{path}: {html}");
        }
        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let upstream = mock::start(200, "[]").await;
        let server = start_server(&upstream, None).await;

        let body = reqwest::get(format!("{server}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
        assert_eq!(upstream.hits(), 0);
    }
}
