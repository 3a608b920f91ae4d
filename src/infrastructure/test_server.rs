//! Axum stub standing in for the remote APIs in client tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Clone)]
struct Route {
    method: String,
    path: String,
    status: u16,
    content_type: &'static str,
    body: String,
}

#[derive(Default)]
struct StubState {
    routes: Vec<Route>,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<StubState>>;

pub struct StubServer {
    base_url: String,
    state: SharedState,
}

impl StubServer {
    pub async fn start() -> Self {
        let state = SharedState::default();
        let router = Router::new().fallback(respond).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move { axum::serve(listener, router).await });

        Self { base_url, state }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn json(&self, method: &str, path: &str, status: u16, body: &str) {
        self.route(method, path, status, "application/json", body);
    }

    pub fn text(&self, method: &str, path: &str, status: u16, body: &str) {
        self.route(method, path, status, "text/plain", body);
    }

    fn route(&self, method: &str, path: &str, status: u16, content_type: &'static str, body: &str) {
        self.state.lock().unwrap().routes.push(Route {
            method: method.to_string(),
            path: path.to_string(),
            status,
            content_type,
            body: body.to_string(),
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }
}

async fn respond(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let route = {
        let mut state = state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: method.as_str().to_string(),
            path: path.clone(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect(),
            body: String::from_utf8_lossy(&body).to_string(),
        });
        state
            .routes
            .iter()
            .find(|r| r.method == method.as_str() && r.path == path)
            .cloned()
    };

    match route {
        Some(route) => (
            StatusCode::from_u16(route.status).unwrap(),
            [(header::CONTENT_TYPE, route.content_type)],
            route.body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "no route").into_response(),
    }
}
