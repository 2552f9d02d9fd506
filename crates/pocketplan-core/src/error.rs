//! Error types for PocketPlan

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Stdin reached end of file while a prompt was waiting for an answer
    #[error("Input closed before the budget was complete")]
    InputClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
