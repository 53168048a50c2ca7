use hibob_jobs_core::api::{classify_response, ApiError, ApiRequest, ApiResult, Method};
use hibob_jobs_core::jobs::{search_entries, SearchQuery};
use log::{debug, warn};
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use super::{basic_auth_header, create_http_client, HibobConfig};

/// Client for the HiBob hiring API
///
/// Every call is a single attempt: no retries, no caching. Expected failures
/// come back as [`ApiError`] values, never as panics.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: HibobConfig,
}

impl ApiClient {
    pub fn new(config: HibobConfig) -> std::result::Result<Self, crate::error::Error> {
        config.validate()?;
        Ok(Self {
            http: create_http_client()?,
            config,
        })
    }

    pub fn config(&self) -> &HibobConfig {
        &self.config
    }

    /// True iff both the service user id and token are set
    pub fn has_credentials(&self) -> bool {
        self.config.credentials.is_complete()
    }

    /// Search job ads and return the raw entries
    ///
    /// Always requests id, title and location and excludes the placeholder job
    /// ad; filters in `query` are added on top.
    pub async fn search(&self, language: &str, query: &SearchQuery) -> ApiResult<Vec<Value>> {
        let request = ApiRequest::search(query, language);
        let response = self.send(&request).await?;
        search_entries(response).inspect_err(|e| warn!("Unexpected HiBob search response: {e}"))
    }

    /// Fetch a single job ad
    pub async fn get_detail(&self, language: &str, job_id: &str) -> ApiResult<Value> {
        let request = ApiRequest::job_ad(job_id, language)?;
        self.send(&request).await
    }

    async fn send(&self, request: &ApiRequest) -> ApiResult<Value> {
        if !self.has_credentials() {
            warn!(
                "Refusing {} {}: HiBob credentials are not configured",
                request.method, request.endpoint
            );
            return Err(ApiError::CredentialsMissing);
        }

        let url = request.url(&self.config.base_url);
        let auth = basic_auth_header(&self.config.credentials)
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let builder = match request.method {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        let mut builder = builder.header(AUTHORIZATION, auth).query(&request.query);

        let request_body = request.body.as_ref().map(Value::to_string);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!("{} {} query={:?}", request.method, url, request.query);
        if let Some(body) = &request_body {
            debug!("Request body: {body}");
        }

        let response = builder.send().await.map_err(|e| {
            warn!("HiBob request {} {} failed: {e}", request.method, url);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read HiBob response body ({status}): {e}");
            ApiError::Transport(e.to_string())
        })?;
        debug!("HiBob responded {status}: {body}");

        classify_response(status, &body).inspect_err(|e| match e {
            ApiError::Api { raw_body, .. } => warn!(
                "HiBob API error {status} for {} {url}: {raw_body} (request body: {})",
                request.method,
                request_body.as_deref().unwrap_or("-")
            ),
            other => warn!("{other} ({} {url}, body: {body})", request.method),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hibob::mock::{self, MockUpstream};
    use hibob_jobs_core::api::{Credentials, ErrorKind};
    use serde_json::json;

    fn client_for(upstream: &MockUpstream, credentials: Credentials) -> ApiClient {
        ApiClient::new(HibobConfig {
            base_url: upstream.base_url.clone(),
            credentials,
            language: "en".to_string(),
        })
        .unwrap()
    }

    fn credentials() -> Credentials {
        Credentials::new("service-user", "token")
    }

    #[tokio::test]
    async fn test_missing_credentials_never_hit_the_network() {
        let upstream = mock::start(200, "[]").await;

        for creds in [
            Credentials::default(),
            Credentials::new("service-user", ""),
            Credentials::new("", "token"),
        ] {
            let client = client_for(&upstream, creds);
            assert!(!client.has_credentials());

            let err = client
                .search("en", &SearchQuery::default())
                .await
                .unwrap_err();
            assert_eq!(err, ApiError::CredentialsMissing);

            let err = client.get_detail("en", "42").await.unwrap_err();
            assert_eq!(err, ApiError::CredentialsMissing);
        }

        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_search_sends_fixed_body_with_basic_auth() {
        let upstream = mock::start(200, r#"[{"/jobAd/id": {"value": "1"}}]"#).await;
        let client = client_for(&upstream, credentials());

        let entries = client.search("de", &SearchQuery::default()).await.unwrap();
        assert_eq!(entries.len(), 1);

        let recorded = upstream.last_request().unwrap();
        assert_eq!(recorded.method, "POST");
        assert_eq!(recorded.path, "/hiring/job-ads/search");
        assert_eq!(recorded.query.as_deref(), Some("preferredLanguage=de"));
        assert_eq!(
            recorded.authorization.as_deref(),
            Some("Basic c2VydmljZS11c2VyOnRva2Vu")
        );
        assert_eq!(
            serde_json::from_str::<Value>(&recorded.body).unwrap(),
            SearchQuery::default().to_body()
        );
    }

    #[tokio::test]
    async fn test_search_honors_filters() {
        let upstream = mock::start(200, "[]").await;
        let client = client_for(&upstream, credentials());
        let query = SearchQuery {
            department: Some("Engineering".into()),
            ..Default::default()
        };

        client.search("en", &query).await.unwrap();

        let body: Value = serde_json::from_str(&upstream.last_request().unwrap().body).unwrap();
        assert_eq!(body["filters"][1]["fieldId"], "/jobAd/department");
        assert_eq!(body["filters"][1]["values"], json!(["Engineering"]));
    }

    #[tokio::test]
    async fn test_get_detail_request() {
        let upstream = mock::start(200, r#"{"id": "42"}"#).await;
        let client = client_for(&upstream, credentials());

        let value = client.get_detail("en", "42").await.unwrap();
        assert_eq!(value, json!({"id": "42"}));

        let recorded = upstream.last_request().unwrap();
        assert_eq!(recorded.method, "GET");
        assert_eq!(recorded.path, "/hiring/job-ads/42");
        assert_eq!(recorded.query.as_deref(), Some("preferredLanguage=en"));
        assert!(recorded.body.is_empty());
    }

    #[tokio::test]
    async fn test_get_detail_empty_id_is_invalid_input() {
        let upstream = mock::start(200, "{}").await;
        let client = client_for(&upstream, credentials());

        let err = client.get_detail("en", "").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(upstream.hits(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_on_success_is_decode_error() {
        let upstream = mock::start(200, "<html>oops</html>").await;
        let client = client_for(&upstream, credentials());

        let err = client.get_detail("en", "42").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodeError);
    }

    #[tokio::test]
    async fn test_error_status_is_classified() {
        let upstream = mock::start(422, r#"{"error": {"message": "Unknown field"}}"#).await;
        let client = client_for(&upstream, credentials());

        let err = client.search("en", &SearchQuery::default()).await.unwrap_err();
        match err {
            ApiError::Api {
                status,
                message,
                raw_body,
            } => {
                assert_eq!(status, 422);
                assert_eq!(message, "Unknown field");
                assert!(raw_body.contains("Unknown field"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = ApiClient::new(HibobConfig {
            base_url: mock::unused_base_url().await,
            credentials: credentials(),
            language: "en".to_string(),
        })
        .unwrap();

        let err = client.get_detail("en", "42").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        let result = ApiClient::new(HibobConfig {
            base_url: "not a url".to_string(),
            credentials: credentials(),
            language: "en".to_string(),
        });
        assert!(result.is_err());
    }
}
