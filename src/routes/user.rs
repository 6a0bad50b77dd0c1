use crate::{
    AppState,
    auth::CurrentUser,
    dto::{Screen, SigninValidation, SignupValidation, SubmitOutcome},
    errors::ApiError,
    forms,
    pages::{AllUsersPage, LeftSidebar, ProfilePage, SavedPage},
    session::SessionSnapshot,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::info;

/// 422 when the form never got past validation, 200 otherwise; the
/// outcome body says whether the remote steps worked.
pub(crate) fn form_response(outcome: SubmitOutcome) -> (StatusCode, Json<SubmitOutcome>) {
    let status = if outcome.is_invalid() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(outcome))
}

/// POST /sign-up
/// Body: { "name": "...", "username": "...", "email": "...", "password": "..." }
pub async fn sign_up(
    State(state): State<AppState>,
    Json(values): Json<SignupValidation>,
) -> (StatusCode, Json<SubmitOutcome>) {
    form_response(forms::submit_sign_up(values, &state.api, &state.session).await)
}

/// POST /sign-in
/// Body: { "email": "...", "password": "..." }
pub async fn sign_in(
    State(state): State<AppState>,
    Json(values): Json<SigninValidation>,
) -> (StatusCode, Json<SubmitOutcome>) {
    form_response(forms::submit_sign_in(values, &state.api, &state.session).await)
}

/// POST /sign-out
pub async fn sign_out(State(state): State<AppState>) -> Json<SubmitOutcome> {
    let screen = state.session.sign_out(&state.api).await;
    info!("Signed out");
    Json(SubmitOutcome::navigate(screen))
}

/// GET /session
pub async fn current_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

#[derive(Debug, Deserialize)]
pub struct SidebarParams {
    #[serde(default = "default_path")]
    pub path: String,
}

fn default_path() -> String {
    Screen::Home.path()
}

/// GET /sidebar?path=/explore
pub async fn sidebar(
    State(state): State<AppState>,
    Query(params): Query<SidebarParams>,
) -> Json<LeftSidebar> {
    let snapshot = state.session.snapshot().await;
    Json(LeftSidebar::build(&snapshot, &params.path))
}

/// GET /all-users
pub async fn all_users(
    State(state): State<AppState>,
    CurrentUser(_): CurrentUser,
) -> Json<AllUsersPage> {
    Json(AllUsersPage::load(&state.api).await)
}

/// GET /profile/{id}
pub async fn profile(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ProfilePage>, ApiError> {
    ProfilePage::load(&state.api, &viewer, &id)
        .await
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// GET /saved
pub async fn saved(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
) -> Json<SavedPage> {
    Json(SavedPage::load(&state.api, &viewer).await)
}
