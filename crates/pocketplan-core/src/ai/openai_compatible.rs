//! OpenAI-compatible backend implementation
//!
//! Talks to the OpenAI chat completions API, or any server that implements
//! `/v1/chat/completions` (vLLM, LocalAI, llama-server, ...).
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_API_KEY`: API key (sent as a bearer token)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::types::{CompletionRequest, CompletionSettings};
use super::AIBackend;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    settings: CompletionSettings,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str, api_key: Option<&str>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.map(str::to_string),
            settings: CompletionSettings::default(),
        }
    }

    /// Create from environment variables
    ///
    /// All variables are optional. Without `OPENAI_API_KEY` the backend is
    /// still created, but every request fails with `Error::MissingApiKey`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Self::new(&base_url, &model, api_key.as_deref())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Create a new instance pointed at a different server
    pub fn with_host(&self, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..self.clone()
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(self.settings.temperature),
            max_tokens: Some(self.settings.max_tokens),
            stream: false,
        }
    }

    /// Make a chat completion request
    async fn chat_completion(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or(Error::MissingApiKey)?;
        let body = self.build_request(request);

        debug!(host = %self.base_url, model = %self.model, "Sending chat completion request");

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api { status, body });
        }

        let text = response.text().await?;
        let chat_response: ChatCompletionResponse = serde_json::from_str(&text)?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("No response from OpenAI API".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    // null when the model refuses or only calls tools
    content: Option<String>,
}

#[async_trait]
impl AIBackend for OpenAICompatibleBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self.chat_completion(request).await?;
        debug!("OpenAI-compatible response: {}", response);
        Ok(response)
    }

    async fn health_check(&self) -> bool {
        // GET /v1/models is cheap and exercises the same credentials
        let mut request = self.http_client.get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), "Health check rejected");
                false
            }
            Err(e) => {
                debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockOpenAIServer;

    #[test]
    fn test_backend_new_trims_trailing_slash() {
        let backend = OpenAICompatibleBackend::new("http://localhost:8080/", "gpt-4", None);
        assert_eq!(backend.host(), "http://localhost:8080");
        assert_eq!(backend.model(), "gpt-4");
    }

    #[test]
    fn test_request_serialization() {
        let backend = OpenAICompatibleBackend::new(DEFAULT_BASE_URL, "gpt-4", Some("sk-test"));
        let request = backend.build_request(&CompletionRequest::user("Hello"));

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert_eq!(json["max_tokens"], 300);
        let temp = json["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 0.001);
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_request_with_system_message() {
        let backend = OpenAICompatibleBackend::new(DEFAULT_BASE_URL, "gpt-4", None);
        let request = backend.build_request(&CompletionRequest {
            system: Some("Be terse.".to_string()),
            user: "Hello".to_string(),
        });

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Spend less."},
                "finish_reason": "stop"
            }]
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("Spend less.")
        );
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:9", "gpt-4", None);
        let err = backend
            .complete(&CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error() {
        // Port 9 (discard) is not listening on loopback in test environments
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:9", "gpt-4", Some("sk"));
        let err = backend
            .complete(&CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_complete_against_mock_server() {
        let server = MockOpenAIServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4", Some("sk-test"));

        let reply = backend
            .complete(&CompletionRequest::user("My monthly income is $3000.00."))
            .await
            .unwrap();
        assert!(reply.contains("Budgeting tip"));

        let seen = server.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer sk-test"));
        assert_eq!(seen[0].body["model"], "gpt-4");
        assert_eq!(seen[0].body["max_tokens"], 300);
        let temp = seen[0].body["temperature"].as_f64().unwrap();
        assert!((temp - 0.7).abs() < 0.001);
        assert_eq!(seen[0].body["messages"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_auth_failure_is_api_error() {
        let server = MockOpenAIServer::start().await;
        let backend =
            OpenAICompatibleBackend::new(&server.url(), "gpt-4", Some(MockOpenAIServer::BAD_KEY));

        let err = backend
            .complete(&CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_api_key"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_data() {
        let server = MockOpenAIServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "empty-model", Some("sk"));

        let err = backend
            .complete(&CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let server = MockOpenAIServer::start().await;
        let backend = OpenAICompatibleBackend::new(&server.url(), "garbage-model", Some("sk"));

        let err = backend
            .complete(&CompletionRequest::user("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[tokio::test]
    async fn test_health_check_against_mock_server() {
        let server = MockOpenAIServer::start().await;

        let backend = OpenAICompatibleBackend::new(&server.url(), "gpt-4", Some("sk-test"));
        assert!(backend.health_check().await);

        let rejected =
            OpenAICompatibleBackend::new(&server.url(), "gpt-4", Some(MockOpenAIServer::BAD_KEY));
        assert!(!rejected.health_check().await);

        // Health checks never reach the completions endpoint
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let backend = OpenAICompatibleBackend::new("http://127.0.0.1:9", "gpt-4", Some("sk"));
        assert!(!backend.health_check().await);
    }
}
