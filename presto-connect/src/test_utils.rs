//! An in-process stand-in for a Presto coordinator.
//!
//! Available to this crate's tests and, through the `test-utils` feature, to
//! crates that want to drive a real [`Connection`](crate::Connection) without
//! a cluster.
use crate::ConnectionOptions;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;


/// A request as seen by the [`StubServer`].
#[derive(Clone, Debug)]
pub struct StubRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl StubRequest {
    /// First value of the header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase())
            .and_then(|value| value.to_str().ok())
    }

    /// Every value of the header `name`, in the order they were sent.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name.to_ascii_lowercase())
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct StubResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl StubResponse {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self { status, headers: vec![], body: body.to_string() }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

type Responder = dyn Fn(&str, &StubRequest) -> StubResponse + Send + Sync;

#[derive(Clone)]
struct StubState {
    base_url: String,
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<StubRequest>>>,
}

/// An HTTP server whose every route is answered by one responder.
///
/// The responder also receives the server's base URL so it can hand out
/// `nextUri`s pointing back at it.
pub struct StubServer {
    pub base_url: String,
    port: u16,
    requests: Arc<Mutex<Vec<StubRequest>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&str, &StubRequest) -> StubResponse + Send + Sync + 'static,
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub server");
        let port = listener.local_addr().expect("No local address").port();
        let base_url = format!("http://127.0.0.1:{port}");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let state = StubState {
            base_url: base_url.clone(),
            responder: Arc::new(responder),
            requests: requests.clone(),
        };
        let app = Router::new().fallback(handle).with_state(state);

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Stub server stopped: {e}");
            }
        });

        Self { base_url, port, requests, task }
    }

    /// Connection options pointing at this server, as user `alice`.
    pub fn options(&self) -> ConnectionOptions {
        let mut options = ConnectionOptions::new("127.0.0.1", "alice");
        options.port = self.port;
        options
    }

    pub fn requests(&self) -> Vec<StubRequest> {
        self.requests.lock().expect("Poisoned request log").clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn handle(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = StubRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let stub = (state.responder)(&state.base_url, &request);
    state.requests.lock().expect("Poisoned request log").push(request);

    let mut builder = Response::builder().status(stub.status);
    for (name, value) in &stub.headers {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(stub.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
