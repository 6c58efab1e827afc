//! # Mock Service — In-Process Events API for Tests
//!
//! A lightweight axum server that mimics the read-only REST API consumed by
//! the client, so the retrieval pipeline and the binary can be exercised over
//! real HTTP without a deployed service.
//!
//! | Method | Path                  | Behavior                                    |
//! |--------|-----------------------|---------------------------------------------|
//! | GET    | `/api/1/events`       | Paginated events, filtered by `search_key`   |
//! | GET    | `/api/1/events/{id}`  | One event, or 404 with an error payload      |
//! | GET    | `/api/1/builds`       | Paginated builds, filtered by NVR / name     |
//!
//! Every request is recorded (path plus query pairs) for assertions.
//!
//! The client is blocking (`ureq`), so tests must run on a multi-thread tokio
//! runtime; otherwise the blocked test thread starves the server task.

#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A request received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct MockState {
    events: Vec<Value>,
    builds: Vec<Value>,
    /// Status returned by both list endpoints instead of data, when set.
    list_error: Option<u16>,
    /// Answer single-event requests with a non-JSON body, when set.
    garbled_event: bool,
    requests: Vec<RecordedRequest>,
}

type SharedState = Arc<Mutex<MockState>>;

/// Event JSON as served by the API.
pub fn event_json(id: i64, event_type_id: i64, state: i64, search_key: &str, builds: Vec<Value>) -> Value {
    json!({
        "id": id,
        "event_type_id": event_type_id,
        "state": state,
        "search_key": search_key,
        "state_reason": format!("reason {}", id),
        "builds": builds,
    })
}

/// Build JSON as served by the API.
pub fn build_json(id: i64, event_id: i64, name: &str, original_nvr: &str, rebuilt_nvr: &str, state_name: &str) -> Value {
    json!({
        "id": id,
        "event_id": event_id,
        "build_id": 5000 + id,
        "name": name,
        "original_nvr": original_nvr,
        "rebuilt_nvr": rebuilt_nvr,
        "state_name": state_name,
        "state_reason": null,
    })
}

pub struct MockService {
    base_url: String,
    _abort_handle: tokio::task::AbortHandle,
    state: SharedState,
}

impl MockService {
    pub fn builder() -> MockServiceBuilder {
        MockServiceBuilder {
            state: MockState::default(),
        }
    }

    pub fn url(&self) -> String {
        self.base_url.clone()
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests whose path equals `path`.
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

pub struct MockServiceBuilder {
    state: MockState,
}

impl MockServiceBuilder {
    pub fn with_events(mut self, events: Vec<Value>) -> Self {
        self.state.events = events;
        self
    }

    pub fn with_builds(mut self, builds: Vec<Value>) -> Self {
        self.state.builds = builds;
        self
    }

    /// Make both list endpoints answer with `status` and a plain-text body.
    pub fn with_list_error(mut self, status: u16) -> Self {
        self.state.list_error = Some(status);
        self
    }

    /// Make the single-event endpoint answer 200 with an HTML body.
    pub fn with_garbled_event(mut self) -> Self {
        self.state.garbled_event = true;
        self
    }

    pub async fn start(self) -> MockService {
        let shared_state: SharedState = Arc::new(Mutex::new(self.state));

        let app = Router::new()
            .route("/api/1/events", get(handle_events))
            .route("/api/1/events/{id}", get(handle_event))
            .route("/api/1/builds", get(handle_builds))
            .with_state(Arc::clone(&shared_state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service to random port");
        let addr = listener
            .local_addr()
            .expect("Failed to get mock service local address");
        let base_url = format!("http://127.0.0.1:{}", addr.port());

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock service failed");
        });

        MockService {
            base_url,
            _abort_handle: handle.abort_handle(),
            state: shared_state,
        }
    }
}

fn record(state: &SharedState, path: String, query: &HashMap<String, String>) {
    state.lock().unwrap().requests.push(RecordedRequest {
        path,
        query: query.clone(),
    });
}

fn page_of(items: Vec<Value>, query: &HashMap<String, String>) -> Vec<Value> {
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page: usize = query
        .get("per_page")
        .and_then(|p| p.parse().ok())
        .unwrap_or(20);
    items
        .chunks(per_page.max(1))
        .nth(page.saturating_sub(1))
        .map(|c| c.to_vec())
        .unwrap_or_default()
}

fn matches(item: &Value, field: &str, query: &HashMap<String, String>) -> bool {
    match query.get(field) {
        Some(wanted) => item[field].as_str() == Some(wanted.as_str()),
        None => true,
    }
}

async fn handle_events(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    record(&state, "/api/1/events".to_string(), &query);
    let s = state.lock().unwrap();
    if let Some(code) = s.list_error {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "mock failure").into_response();
    }
    let filtered: Vec<Value> = s
        .events
        .iter()
        .filter(|e| matches(e, "search_key", &query))
        .cloned()
        .collect();
    Json(json!({ "items": page_of(filtered, &query) })).into_response()
}

async fn handle_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    record(&state, format!("/api/1/events/{}", id), &HashMap::new());
    let s = state.lock().unwrap();
    if s.garbled_event {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    let found = s
        .events
        .iter()
        .find(|e| e["id"].to_string() == id)
        .cloned();
    match found {
        Some(event) => (StatusCode::OK, Json(event)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": 404,
                "error": "Not Found",
                "message": "No such event found.",
            })),
        )
            .into_response(),
    }
}

async fn handle_builds(
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    record(&state, "/api/1/builds".to_string(), &query);
    let s = state.lock().unwrap();
    if let Some(code) = s.list_error {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "mock failure").into_response();
    }
    let filtered: Vec<Value> = s
        .builds
        .iter()
        .filter(|b| {
            matches(b, "rebuilt_nvr", &query)
                && matches(b, "original_nvr", &query)
                && matches(b, "name", &query)
        })
        .cloned()
        .collect();
    Json(json!({ "items": page_of(filtered, &query) })).into_response()
}
