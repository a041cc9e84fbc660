//! Session error types.

use thiserror::Error;
use vidbox_client::ApiError;
use vidbox_models::VideoId;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Unknown video: {0}")]
    UnknownVideo(VideoId),

    #[error("No info loaded for video {0}")]
    NoInfoLoaded(VideoId),
}

impl SessionError {
    /// Human-readable text for display.
    pub fn message(&self) -> String {
        match self {
            SessionError::Api(e) => e.message(),
            other => other.to_string(),
        }
    }
}
