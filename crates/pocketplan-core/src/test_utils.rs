//! Test utilities for pocketplan-core
//!
//! A mock OpenAI-compatible server for integration tests. It records every
//! request it receives and picks its behaviour from the request:
//! - API key `bad-key` gets a 401 like the real API
//! - model `empty-model` gets a response with no choices
//! - model `garbage-model` gets a 200 with a non-JSON body
//! - anything else gets a short list of tips
//!
//! `GET /v1/models` answers health checks, with the same 401 for `bad-key`.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// A request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

type Recorded = Arc<Mutex<Vec<RecordedRequest>>>;

/// Mock OpenAI-compatible server for testing
pub struct MockOpenAIServer {
    addr: SocketAddr,
    recorded: Recorded,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOpenAIServer {
    /// API key the server rejects with 401
    pub const BAD_KEY: &'static str = "bad-key";

    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let recorded: Recorded = Arc::default();
        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/v1/models", get(handle_models))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            recorded,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorded.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOpenAIServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_chat_completions(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    recorded.lock().unwrap().push(RecordedRequest {
        authorization: authorization.clone(),
        body: body.clone(),
    });

    if is_rejected(authorization.as_deref()) {
        return unauthorized();
    }

    let model = body["model"].as_str().unwrap_or_default().to_string();
    match model.as_str() {
        "empty-model" => Json(json!({ "id": "chatcmpl-mock", "choices": [] })).into_response(),
        "garbage-model" => (StatusCode::OK, "this is not json").into_response(),
        _ => {
            let prompt = body["messages"]
                .as_array()
                .and_then(|m| m.last())
                .and_then(|m| m["content"].as_str())
                .unwrap_or_default();
            Json(json!({
                "id": "chatcmpl-mock",
                "object": "chat.completion",
                "model": model,
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": format!(
                            "\n  1. Budgeting tip: automate transfers.\n  2. Budgeting tip: prompt had {} characters.\n",
                            prompt.len()
                        )
                    },
                    "finish_reason": "stop"
                }]
            }))
            .into_response()
        }
    }
}

async fn handle_models(headers: HeaderMap) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if is_rejected(authorization) {
        return unauthorized();
    }
    Json(json!({
        "object": "list",
        "data": [{ "id": "gpt-4", "object": "model", "owned_by": "mock" }]
    }))
    .into_response()
}

fn is_rejected(authorization: Option<&str>) -> bool {
    let rejected = format!("Bearer {}", MockOpenAIServer::BAD_KEY);
    authorization == Some(rejected.as_str())
}

fn unauthorized() -> Response {
    let error = json!({
        "error": {
            "message": "Incorrect API key provided",
            "type": "invalid_request_error",
            "code": "invalid_api_key"
        }
    });
    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}
