#![allow(dead_code)]

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use serde_json::{Value, json};
use tracing_subscriber::fmt::MakeWriter;
use uuid::Uuid;

/// A request the mock service received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path:          String,
    pub authorization: Option<String>,
    pub body:          Value,
}

#[derive(Clone)]
struct MockState {
    recorded:     Arc<Mutex<Vec<Recorded>>>,
    grade_status: StatusCode,
    grade_body:   Value,
}

/// Grading and identity endpoints served from a background thread.
pub struct MockService {
    pub base:     String,
    pub recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl MockService {
    pub fn start() -> Self {
        Self::with_grade_response(StatusCode::OK, sample_response())
    }

    pub fn with_grade_response(grade_status: StatusCode, grade_body: Value) -> Self {
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            recorded: Arc::clone(&recorded),
            grade_status,
            grade_body,
        };

        let app = Router::new()
            .route("/api/autograde", post(grade))
            .route("/user", get(user))
            .with_state(state);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("build runtime");
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind mock service");
        let addr = listener.local_addr().expect("local addr");

        std::thread::spawn(move || {
            runtime.block_on(async move {
                axum::serve(listener, app).await.expect("serve mock service");
            });
        });

        Self {
            base: format!("http://{addr}"),
            recorded,
        }
    }

    pub fn grade_url(&self) -> String {
        format!("{}/api/autograde", self.base)
    }

    pub fn user_url(&self) -> String {
        format!("{}/user", self.base)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.recorded.lock().expect("recorded lock").clone()
    }

    pub fn grade_requests(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == "/api/autograde")
            .collect()
    }
}

fn record(state: &MockState, path: &str, headers: &HeaderMap, body: Value) {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    state.recorded.lock().expect("recorded lock").push(Recorded {
        path: path.to_string(),
        authorization,
        body,
    });
}

async fn grade(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    record(&state, "/api/autograde", &headers, body);
    (state.grade_status, Json(state.grade_body.clone()))
}

/// Accepts only `token good`, and reports the login `alice`.
async fn user(State(state): State<MockState>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    record(&state, "/user", &headers, Value::Null);
    match headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some("token good") => (StatusCode::OK, Json(json!({ "login": "alice", "id": 1 }))),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Bad credentials" })),
        ),
    }
}

pub fn sample_response() -> Value {
    json!({
        "tests": [{ "name": "test1", "pointsAwarded": 10, "feedback": "Good job" }],
        "totalPointsAwarded": 10,
        "totalPointsPossible": 10,
        "specificCodeFeedback": {
            "code": [{ "feedback": "Good code", "recommendation": "Keep it up" }],
            "general": "Overall good work"
        }
    })
}

pub fn temp_dir(prefix: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::new_v4()));
    fs::create_dir_all(&root).expect("create temp root");
    root
}

/// Log sink shared between a test and the subscriber writing into it.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("log lock")).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
