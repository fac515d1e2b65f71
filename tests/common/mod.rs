//! In-process stand-in for the feedback backend.
//!
//! Replies can be scripted one request at a time and optionally held behind a
//! gate, so tests can keep a request in flight for as long as they need.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::Semaphore;

pub const CREATED_AT: &str = "2024-01-01T00:00:00Z";

pub fn entry_json(id: i64, name: &str, message: &str) -> Value {
    json!({ "id": id, "name": name, "message": message, "createdAt": CREATED_AT })
}

#[derive(Debug, Clone)]
enum Body {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: Body,
    gate: Option<Arc<Semaphore>>,
}

impl Reply {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Body::Json(body),
            gate: None,
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: Body::Text(body.to_string()),
            gate: None,
        }
    }

    pub fn data(data: Value) -> Self {
        Self::json(StatusCode::OK, json!({ "success": true, "data": data }))
    }

    pub fn failure(error: &str) -> Self {
        Self::json(StatusCode::OK, json!({ "success": false, "error": error }))
    }

    pub fn into_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Hold the response until a permit is added to `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    async fn respond(self) -> Response {
        if let Some(gate) = self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        match self.body {
            Body::Json(value) => (self.status, Json(value)).into_response(),
            Body::Text(text) => (self.status, text).into_response(),
        }
    }
}

/// What the stub saw.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub tunnel_header: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

struct Inner {
    list_default: Reply,
    list_replies: VecDeque<Reply>,
    create_replies: VecDeque<Reply>,
    requests: Vec<Recorded>,
    next_id: i64,
}

#[derive(Clone)]
pub struct StubBackend {
    inner: Arc<Mutex<Inner>>,
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StubBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                list_default: Reply::data(json!([])),
                list_replies: VecDeque::new(),
                create_replies: VecDeque::new(),
                requests: Vec::new(),
                next_id: 100,
            })),
        }
    }

    /// Answer every list request with `entries` unless a one-shot reply is queued.
    pub fn with_list(entries: Value) -> Self {
        let stub = Self::new();
        stub.set_list(Reply::data(entries));
        stub
    }

    pub fn set_list(&self, reply: Reply) {
        self.inner.lock().unwrap().list_default = reply;
    }

    pub fn push_list(&self, reply: Reply) {
        self.inner.lock().unwrap().list_replies.push_back(reply);
    }

    /// Queue a reply for the next create. Without one, the stub echoes the
    /// posted fields back with a fresh id.
    pub fn push_create(&self, reply: Reply) {
        self.inner.lock().unwrap().create_replies.push_back(reply);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }

    /// Serve on an ephemeral local port and return the base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/api/feedback", get(list_feedback).post(create_feedback))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub backend failed");
        });
        format!("http://{}", addr)
    }

    fn record(&self, method: &'static str, headers: &HeaderMap, body: Option<Value>) {
        let header_text = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let recorded = Recorded {
            method,
            tunnel_header: header_text("ngrok-skip-browser-warning"),
            content_type: header_text(header::CONTENT_TYPE.as_str()),
            body,
        };
        self.inner.lock().unwrap().requests.push(recorded);
    }
}

async fn list_feedback(State(stub): State<StubBackend>, headers: HeaderMap) -> Response {
    stub.record("GET", &headers, None);
    let reply = {
        let mut inner = stub.inner.lock().unwrap();
        inner
            .list_replies
            .pop_front()
            .unwrap_or_else(|| inner.list_default.clone())
    };
    reply.respond().await
}

async fn create_feedback(
    State(stub): State<StubBackend>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let body: Option<Value> = serde_json::from_str(&body).ok();
    stub.record("POST", &headers, body.clone());

    let reply = {
        let mut inner = stub.inner.lock().unwrap();
        match inner.create_replies.pop_front() {
            Some(reply) => reply,
            None => {
                let id = inner.next_id;
                inner.next_id += 1;
                let body = body.unwrap_or(Value::Null);
                Reply::data(json!({
                    "id": id,
                    "name": body["name"],
                    "message": body["message"],
                    "createdAt": CREATED_AT,
                }))
            }
        }
    };
    reply.respond().await
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{}", addr)
}

/// Poll until `condition` holds, failing the test after a couple of seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..400 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}
