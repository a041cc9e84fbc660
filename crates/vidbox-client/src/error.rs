//! Video API error types.

use thiserror::Error;

/// Result type for video API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the video API.
///
/// Transport failures and non-success statuses are both plain failures;
/// no distinction is made between "not found" and "server error".
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn from_http_status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status, if the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-readable text for display.
    ///
    /// For status errors this is the response body as sent by the server,
    /// or a short generic message when the body is blank.
    pub fn message(&self) -> String {
        match self {
            ApiError::Status { body, .. } if !body.trim().is_empty() => body.clone(),
            ApiError::Status { status, .. } => format!("Request failed ({})", status),
            other => other.to_string(),
        }
    }
}
