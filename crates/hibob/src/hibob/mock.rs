//! Throwaway HiBob upstream for tests
//!
//! Binds an axum server to a random local port, answers every request with a
//! canned status and body, and records what it received.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode, Uri},
    Router,
};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

struct Upstream {
    status: StatusCode,
    body: String,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockUpstream {
    pub base_url: String,
    state: Arc<Upstream>,
}

impl MockUpstream {
    pub fn hits(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.requests.lock().unwrap().last().cloned()
    }
}

pub async fn start(status: u16, body: &str) -> MockUpstream {
    let state = Arc::new(Upstream {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        requests: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .fallback(respond)
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });

    MockUpstream {
        base_url: format!("http://{addr}/v1"),
        state,
    }
}

/// Base URL of a port nothing listens on.
pub async fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1")
}

async fn respond(
    State(state): State<Arc<Upstream>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let path = uri.path().strip_prefix("/v1").unwrap_or(uri.path()).to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path,
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (state.status, state.body.clone())
}
