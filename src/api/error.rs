//! Backend API errors

use thiserror::Error;

/// Errors raised while talking to the game backend
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid backend base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Backend did not issue a session id")]
    MissingSessionId,
}

impl ApiError {
    /// Whether the request timed out before the backend answered
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
