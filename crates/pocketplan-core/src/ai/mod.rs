//! Pluggable AI backend abstraction
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all AI operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (openai, mock). Default: openai
//! - `OPENAI_API_KEY`: API key (required for real requests)
//! - `OPENAI_BASE_URL`: Server URL (default: https://api.openai.com)
//! - `OPENAI_MODEL`: Model name (default: gpt-4)

mod mock;
mod openai_compatible;
pub mod types;

pub use mock::MockBackend;
pub use openai_compatible::OpenAICompatibleBackend;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all AI backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Send a prompt and return the generated text
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Check if the backend is reachable and accepts our credentials
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// OpenAI chat completions API, or any server that speaks it
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `openai` (default): Uses OPENAI_API_KEY, OPENAI_BASE_URL and OPENAI_MODEL
    /// - `mock`: Canned tips, no network access
    ///
    /// A missing API key is not an error here; requests fail with
    /// `Error::MissingApiKey` instead.
    pub fn from_env() -> Self {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "openai".to_string());

        match backend.to_lowercase().as_str() {
            "openai" | "openai_compatible" => {
                AIClient::OpenAICompatible(OpenAICompatibleBackend::from_env())
            }
            "mock" => AIClient::Mock(MockBackend::new()),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to openai");
                AIClient::OpenAICompatible(OpenAICompatibleBackend::from_env())
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_model(model)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }

    /// Create a new instance pointed at a different server
    pub fn with_host(&self, base_url: &str) -> Self {
        match self {
            AIClient::OpenAICompatible(b) => AIClient::OpenAICompatible(b.with_host(base_url)),
            AIClient::Mock(b) => AIClient::Mock(b.clone()),
        }
    }
}

// Implement AIBackend for AIClient by delegating to the inner backend
#[async_trait]
impl AIBackend for AIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match self {
            AIClient::OpenAICompatible(b) => b.complete(request).await,
            AIClient::Mock(b) => b.complete(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[test]
    fn test_with_model_and_host() {
        let client = AIClient::OpenAICompatible(OpenAICompatibleBackend::new(
            "https://api.openai.com",
            "gpt-4",
            None,
        ));
        let client = client
            .with_model("gpt-4o-mini")
            .with_host("http://localhost:8080/");
        assert_eq!(client.model(), "gpt-4o-mini");
        assert_eq!(client.host(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_mock_complete() {
        let client = AIClient::mock();
        let tips = client
            .complete(&CompletionRequest::user("help me save"))
            .await
            .unwrap();
        assert!(!tips.is_empty());
    }

    #[tokio::test]
    async fn test_health_check_delegates() {
        assert!(AIClient::mock().health_check().await);
        assert!(!AIClient::Mock(MockBackend::unhealthy()).health_check().await);
    }
}
