use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

#[derive(Debug)]
pub enum ApiError {
    /// Nobody is signed in
    Unauthorized,
    /// Signed in, but not the owner of the resource
    Forbidden,
    NotFound,
    /// The remote call failed; the wrapper layer already logged why
    RemoteFailed(&'static str),
}

/// Convert our custom errors to HTTP responses
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden"),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found"),
            ApiError::RemoteFailed(operation) => {
                warn!("{} failed", operation);
                (StatusCode::BAD_GATEWAY, "Please try again")
            }
        };

        (
            status,
            Json(serde_json::json!({
              "error": message
            })),
        )
            .into_response()
    }
}
