//! In-process mock of the Bot API.
//!
//! `getUpdates` answers from a script of canned responses and hangs like a
//! real long poll once the script runs out. Every other method is recorded
//! (multipart fields when the body is a form) and answered from a separate
//! script.

#![allow(dead_code)]

use axum::{
    body::to_bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tgpoll_client::Endpoint;
use tgpoll_core::config::PollSettings;

pub const TOKEN: &str = "test-token";

/// One recorded `getUpdates` request.
#[derive(Debug, Clone)]
pub struct PollRequest {
    pub offset: i64,
    pub timeout: i64,
    pub content_type: String,
    pub at: Instant,
}

/// One multipart field of a recorded command.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub bot: String,
    pub method: String,
    pub content_type: Option<String>,
    pub body_len: usize,
    pub fields: Vec<Field>,
}

#[derive(Default)]
pub struct MockState {
    poll_script: Mutex<VecDeque<(StatusCode, Value)>>,
    command_script: Mutex<VecDeque<Value>>,
    polls: Mutex<Vec<PollRequest>>,
    commands: Mutex<Vec<CommandRequest>>,
}

pub struct MockApi {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/{bot}/{method}", post(dispatch))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::with_base(format!("http://{}", self.addr))
    }

    /// Queue a `getUpdates` answer.
    pub fn push_poll(&self, body: Value) {
        self.push_poll_status(StatusCode::OK, body);
    }

    pub fn push_poll_status(&self, status: StatusCode, body: Value) {
        self.state
            .poll_script
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    /// Queue `{ok: true, result: [{update_id}, ...]}`.
    pub fn push_updates(&self, ids: &[i64]) {
        let result: Vec<Value> = ids
            .iter()
            .map(|id| json!({"update_id": id, "message": {"message_id": id, "chat": {"id": 1}, "text": format!("m{id}")}}))
            .collect();
        self.push_poll(json!({"ok": true, "result": result}));
    }

    /// Queue an answer for the next command.
    pub fn push_command(&self, body: Value) {
        self.state.command_script.lock().unwrap().push_back(body);
    }

    pub fn polls(&self) -> Vec<PollRequest> {
        self.state.polls.lock().unwrap().clone()
    }

    pub fn offsets(&self) -> Vec<i64> {
        self.polls().iter().map(|p| p.offset).collect()
    }

    pub fn commands(&self) -> Vec<CommandRequest> {
        self.state.commands.lock().unwrap().clone()
    }

    /// Wait until at least `n` `getUpdates` requests arrived.
    pub async fn wait_for_polls(&self, n: usize) {
        let deadline = Duration::from_secs(5);
        tokio::time::timeout(deadline, async {
            while self.state.polls.lock().unwrap().len() < n {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("expected {n} polls, got {:?}", self.offsets()));
    }
}

/// Fast retries, real long-poll timeout.
pub fn test_settings() -> PollSettings {
    PollSettings {
        poll_timeout: Duration::from_secs(30),
        retry_delay: Duration::from_millis(50),
        request_timeout: Duration::from_secs(40),
    }
}

async fn dispatch(
    State(state): State<Arc<MockState>>,
    Path((bot, method)): Path<(String, String)>,
    request: Request,
) -> Response {
    if method == "getUpdates" {
        return get_updates(state, request).await;
    }

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut fields = Vec::new();
    let mut body_len = 0;
    if content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    {
        // Strict parse: a truncated form fails the request.
        let mut multipart = Multipart::from_request(request, &()).await.unwrap();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.unwrap();
            body_len += data.len();
            fields.push(Field {
                name,
                value: String::from_utf8_lossy(&data).into_owned(),
                file_name,
            });
        }
    } else {
        body_len = to_bytes(request.into_body(), usize::MAX).await.unwrap().len();
    }

    state.commands.lock().unwrap().push(CommandRequest {
        bot,
        method,
        content_type,
        body_len,
        fields,
    });

    let body = state
        .command_script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| json!({"ok": true, "result": true}));
    Json(body).into_response()
}

async fn get_updates(state: Arc<MockState>, request: Request) -> Response {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(request.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    state.polls.lock().unwrap().push(PollRequest {
        offset: body["offset"].as_i64().unwrap(),
        timeout: body["timeout"].as_i64().unwrap(),
        content_type,
        at: Instant::now(),
    });

    let next = state.poll_script.lock().unwrap().pop_front();
    match next {
        Some((status, body)) => (status, Json(body)).into_response(),
        None => {
            // Nothing queued: hold the request open like a real long poll.
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Json(json!({"ok": true, "result": []})).into_response()
        }
    }
}
