use thiserror::Error;

/// Errors surfaced by a [`Backend`](super::Backend) implementation.
///
/// The wrapper layer never inspects these beyond logging them; they exist so
/// the backends themselves can report what went wrong.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Request never reached the service, or the connection broke
    #[error("Transport error: {0}")]
    Transport(String),

    /// No live session, or the session was rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Document or account already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Any other error body returned by the remote service
    #[error("Remote error ({code} {kind}): {message}")]
    Remote {
        code: u16,
        kind: String,
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else {
            BackendError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::Decode(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BackendError>;
