//! Mock backend for testing
//!
//! Returns a fixed reply, or a fixed failure, without touching the network.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::CompletionRequest;
use super::AIBackend;

const DEFAULT_TIPS: &str = "1. Pay yourself first: move your savings goal out on payday.
2. Review subscriptions and cancel the ones you have not used this month.
3. Plan meals for the week to cut impulse food spending.";

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    reply: std::result::Result<String, String>,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl MockBackend {
    /// Mock that answers with a short list of generic tips
    pub fn new() -> Self {
        Self {
            reply: Ok(DEFAULT_TIPS.to_string()),
            healthy: true,
        }
    }

    /// Mock that answers every request with `text`
    pub fn with_reply(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            healthy: true,
        }
    }

    /// Mock whose requests all fail with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            healthy: true,
        }
    }

    /// Mock that reports itself unreachable
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(Error::InvalidData(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
