//! Error types for the protocol layer

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while executing a remote operation
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connectivity failure, reported after the physical retry budget is
    /// exhausted
    #[error("network error: {0}")]
    Transport(String),

    /// The service answered with a non-OK status
    #[error("tuner error (code {code}): {message}")]
    Api { code: i32, message: String },

    /// The session token expired and could not be refreshed
    #[error("authentication expired")]
    AuthExpired,

    /// The operation could not be turned into a physical request
    /// (missing token, malformed payload)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response body did not parse as the expected JSON envelope
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client construction failed
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an API error from an envelope status code and message
    pub fn api(code: i32, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// True for connectivity failures (the only retryable class)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}
