#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

/// What `GET /count` answers with.
#[derive(Debug, Clone)]
pub struct CountReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Duration,
}

impl CountReply {
    pub fn count(count: u64) -> Self {
        Self::raw(StatusCode::OK, &json!({ "peopleCount": count }).to_string())
    }

    pub fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// Hold the answer back for `delay`.
    pub fn delayed(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }
}

#[derive(Debug)]
struct MockState {
    count: CountReply,
    count_hits: usize,
    processing: bool,
    healthy: bool,
}

/// Stand-in for the detection backend, listening on an ephemeral port.
#[derive(Debug, Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockState {
            count: CountReply::count(0),
            count_hits: 0,
            processing: false,
            healthy: true,
        }));

        let app = Router::new()
            .route("/count", get(count))
            .route("/health", get(health))
            .route("/start_stream", post(start_stream))
            .route("/stop_stream", post(stop_stream))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend failed");
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn reply_with(&self, reply: CountReply) {
        self.state.lock().unwrap().count = reply;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.state.lock().unwrap().healthy = healthy;
    }

    pub fn count_hits(&self) -> usize {
        self.state.lock().unwrap().count_hits
    }

    pub fn processing(&self) -> bool {
        self.state.lock().unwrap().processing
    }
}

type Shared = State<Arc<Mutex<MockState>>>;

async fn count(State(state): Shared) -> impl IntoResponse {
    let reply = {
        let mut state = state.lock().unwrap();
        state.count_hits += 1;
        state.count.clone()
    };
    tokio::time::sleep(reply.delay).await;
    (reply.status, [("content-type", "application/json")], reply.body)
}

async fn health(State(state): Shared) -> impl IntoResponse {
    if state.lock().unwrap().healthy {
        (StatusCode::OK, Json(json!({ "status": "ok" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        )
    }
}

async fn start_stream(State(state): Shared) -> impl IntoResponse {
    state.lock().unwrap().processing = true;
    Json(json!({ "status": "started" }))
}

async fn stop_stream(State(state): Shared) -> impl IntoResponse {
    state.lock().unwrap().processing = false;
    Json(json!({ "status": "stopped" }))
}

/// An address nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    drop(listener);
    format!("http://{addr}")
}
