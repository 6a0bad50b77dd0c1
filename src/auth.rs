use crate::{errors::ApiError, models::User, states::AppState};
use axum::{extract::FromRequestParts, http::request::Parts};

/// The signed-in user, taken from the session context.
/// Use as a handler parameter to require authentication.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .session
            .user()
            .await
            .map(CurrentUser)
            .ok_or(ApiError::Unauthorized)
    }
}
