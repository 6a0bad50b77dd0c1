use crate::{
    AppState,
    api::DeleteStatus,
    auth::CurrentUser,
    dto::{PostValidation, SubmitOutcome, field_errors},
    errors::ApiError,
    forms,
    models::{Post, Save, UpdatePost, User},
    pages::{ExplorePage, HomePage, PostCard, toggle_like},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::user::form_response;

/// GET /
pub async fn home(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
) -> Json<HomePage> {
    Json(HomePage::load(&state.api, &viewer).await)
}

#[derive(Debug, Deserialize)]
pub struct ExploreParams {
    pub search: Option<String>,
    pub cursor: Option<String>,
}

/// GET /explore?search=...&cursor=...
pub async fn explore(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Query(params): Query<ExploreParams>,
) -> Json<ExplorePage> {
    Json(
        ExplorePage::load(
            &state.api,
            &viewer,
            params.search.as_deref(),
            params.cursor.as_deref(),
        )
        .await,
    )
}

/// POST /create-post
/// Body: { "caption": "...", "location": "...", "tags": "a, b", "image_url": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    Json(values): Json<PostValidation>,
) -> (StatusCode, Json<SubmitOutcome>) {
    form_response(forms::submit_create_post(values, &state.api, &state.session).await)
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PostCard>, ApiError> {
    let post = state
        .api
        .get_post_by_id(&id)
        .await
        .ok_or(ApiError::NotFound)?;
    Ok(Json(PostCard::new(post, &viewer)))
}

async fn owned_post(state: &AppState, id: &str, user: &User) -> Result<Post, ApiError> {
    let post = state
        .api
        .get_post_by_id(id)
        .await
        .ok_or(ApiError::NotFound)?;

    // Check ownership
    if post.creator.id() != user.id {
        return Err(ApiError::Forbidden);
    }
    Ok(post)
}

/// PATCH /posts/{id}
/// Body: same as POST /create-post
pub async fn update_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(values): Json<PostValidation>,
) -> Result<Response, ApiError> {
    if let Err(errors) = values.validate() {
        return Ok(form_response(SubmitOutcome::invalid(field_errors(&errors))).into_response());
    }

    owned_post(&state, &id, &user).await?;

    let tags = values.tag_list();
    let post = state
        .api
        .update_post(
            &id,
            UpdatePost {
                caption: values.caption,
                location: values.location,
                tags,
                image_url: values.image_url,
            },
        )
        .await
        .ok_or(ApiError::RemoteFailed("update_post"))?;

    info!("Post updated: {} by user {}", id, user.id);

    Ok(Json(PostCard::new(post, &user)).into_response())
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteStatus>, ApiError> {
    owned_post(&state, &id, &user).await?;

    let status = state
        .api
        .delete_post(&id)
        .await
        .ok_or(ApiError::RemoteFailed("delete_post"))?;

    info!("Post deleted: {} by user {}", id, user.id);

    Ok(Json(status))
}

/// POST /posts/{id}/like
/// Toggles the current user's like.
pub async fn like_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<PostCard>, ApiError> {
    let post = state
        .api
        .get_post_by_id(&id)
        .await
        .ok_or(ApiError::NotFound)?;

    let likes = toggle_like(&post.like_ids(), &user.id);
    let post = state
        .api
        .like_post(&id, &likes)
        .await
        .ok_or(ApiError::RemoteFailed("like_post"))?;

    Ok(Json(PostCard::new(post, &user)))
}

#[derive(Debug, Serialize)]
pub struct SaveToggle {
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Save>,
}

/// POST /posts/{id}/save
/// Saves the post for the current user, or removes the existing save.
pub async fn save_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SaveToggle>, ApiError> {
    let existing = state
        .api
        .find_saved_post(&user.id, &id)
        .await
        .ok_or(ApiError::RemoteFailed("find_saved_post"))?;

    if let Some(existing) = existing {
        state
            .api
            .delete_saved_post(&existing.id)
            .await
            .ok_or(ApiError::RemoteFailed("delete_saved_post"))?;
        return Ok(Json(SaveToggle {
            saved: false,
            record: None,
        }));
    }

    let record = state
        .api
        .save_post(&user.id, &id)
        .await
        .ok_or(ApiError::RemoteFailed("save_post"))?;

    Ok(Json(SaveToggle {
        saved: true,
        record: Some(record),
    }))
}

/// DELETE /saves/{id}
pub async fn delete_saved_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<DeleteStatus>, ApiError> {
    let save = state
        .api
        .get_saved_record_by_id(&id)
        .await
        .ok_or(ApiError::NotFound)?;

    // Check ownership
    if save.user.id() != user.id {
        return Err(ApiError::Forbidden);
    }

    let status = state
        .api
        .delete_saved_post(&id)
        .await
        .ok_or(ApiError::RemoteFailed("delete_saved_post"))?;

    info!("Save removed: {} by user {}", id, user.id);

    Ok(Json(status))
}
