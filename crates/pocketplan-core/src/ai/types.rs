//! AI backend request types
//!
//! These types are backend-agnostic and used across all AI implementations.

use serde::{Deserialize, Serialize};

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Optional system instructions sent ahead of the user message
    #[serde(default)]
    pub system: Option<String>,
    pub user: String,
}

impl CompletionRequest {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            system: None,
            user: text.into(),
        }
    }
}

/// Sampling settings for a completion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}
