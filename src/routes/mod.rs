pub mod health;
pub mod post;
pub mod user;

use crate::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public routes (no session required)
        .route("/health", get(health::health_check))
        .route("/sign-up", post(user::sign_up))
        .route("/sign-in", post(user::sign_in))
        .route("/sign-out", post(user::sign_out))
        .route("/session", get(user::current_session))
        .route("/sidebar", get(user::sidebar))
        // Routes that need a signed-in user
        .route("/", get(post::home))
        .route("/explore", get(post::explore))
        .route("/all-users", get(user::all_users))
        .route("/profile/{id}", get(user::profile))
        .route("/saved", get(user::saved))
        .route("/create-post", post(post::create_post))
        .route(
            "/posts/{id}",
            get(post::get_post)
                .patch(post::update_post)
                .delete(post::delete_post),
        )
        .route("/posts/{id}/like", post(post::like_post))
        .route("/posts/{id}/save", post(post::save_post))
        .route("/saves/{id}", delete(post::delete_saved_post))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Api;
    use crate::backend::{Backend, Collection, Query};
    use crate::testing::RecordingBackend;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Arc<RecordingBackend>, Router) {
        let backend = Arc::new(RecordingBackend::new());
        let state = AppState::new(Api::new(backend.clone()));
        (backend, router(state))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn signup_body() -> Value {
        json!({
            "name": "Ada Lovelace",
            "username": "ada",
            "email": "ada@example.com",
            "password": "password123"
        })
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_, app) = app();
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "snapgram");
    }

    #[tokio::test]
    async fn pages_require_sign_in() {
        let (_, app) = app();
        for uri in ["/", "/explore", "/all-users", "/saved", "/profile/u1"] {
            let (status, body) = send(&app, Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["error"], "Unauthorized");
        }
    }

    #[tokio::test]
    async fn invalid_sign_up_is_unprocessable() {
        let (backend, app) = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/sign-up",
            Some(json!({
                "name": "A",
                "username": "ada",
                "email": "x",
                "password": "password123"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field_errors"]["name"][0], "Too short");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn sign_up_then_browse_and_sign_out() {
        let (backend, app) = app();

        let (status, body) = send(&app, Method::POST, "/sign-up", Some(signup_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["navigate"], "/");
        assert_eq!(body["reset_form"], true);

        let (_, sidebar) = send(&app, Method::GET, "/sidebar?path=/", None).await;
        assert_eq!(sidebar["profile"]["username"], "@ada");
        assert_eq!(sidebar["links"][0]["is_active"], true);

        let (status, body) = send(
            &app,
            Method::POST,
            "/create-post",
            Some(json!({ "caption": "First light", "location": "Bath", "tags": "dawn" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["navigate"], "/");

        let (status, home) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        let post_id = home["posts"][0]["post"]["$id"].as_str().unwrap().to_string();
        assert_eq!(home["creators"][0]["username"], "ada");

        let (_, liked) = send(&app, Method::POST, &format!("/posts/{post_id}/like"), None).await;
        assert_eq!(liked["liked"], true);
        assert_eq!(liked["like_count"], 1);
        let (_, unliked) = send(&app, Method::POST, &format!("/posts/{post_id}/like"), None).await;
        assert_eq!(unliked["liked"], false);

        let (_, saved) = send(&app, Method::POST, &format!("/posts/{post_id}/save"), None).await;
        assert_eq!(saved["saved"], true);
        let (_, page) = send(&app, Method::GET, "/saved", None).await;
        assert_eq!(page["saved"].as_array().unwrap().len(), 1);
        let (_, unsaved) = send(&app, Method::POST, &format!("/posts/{post_id}/save"), None).await;
        assert_eq!(unsaved["saved"], false);

        let (_, explore) = send(&app, Method::GET, "/explore?search=light", None).await;
        assert_eq!(explore["posts"].as_array().unwrap().len(), 1);

        backend.fail("delete_session");
        let (status, body) = send(&app, Method::POST, "/sign-out", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["navigate"], "/sign-in");

        let (status, _) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (_, session) = send(&app, Method::GET, "/session", None).await;
        assert_eq!(session["is_authenticated"], false);
    }

    #[tokio::test]
    async fn only_creator_may_edit_or_delete() {
        let (backend, app) = app();
        send(&app, Method::POST, "/sign-up", Some(signup_body())).await;

        let foreign = backend
            .inner()
            .create_document(
                Collection::Posts,
                "p-foreign",
                json!({ "caption": "not yours", "creator": "someone-else" }),
            )
            .await
            .unwrap();
        let uri = format!("/posts/{}", foreign["$id"].as_str().unwrap());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let edit = json!({ "caption": "mine now", "location": "Here" });
        let (status, _) = send(&app, Method::PATCH, &uri, Some(edit)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, Method::GET, "/posts/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn creator_updates_and_deletes_own_post() {
        let (_, app) = app();
        send(&app, Method::POST, "/sign-up", Some(signup_body())).await;
        send(
            &app,
            Method::POST,
            "/create-post",
            Some(json!({ "caption": "Draft caption", "location": "Bath" })),
        )
        .await;
        let (_, explore) = send(&app, Method::GET, "/explore", None).await;
        let post_id = explore["posts"][0]["post"]["$id"].as_str().unwrap().to_string();
        let uri = format!("/posts/{post_id}");

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(json!({ "caption": "Final caption", "location": "Bath", "tags": "a,b" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["post"]["caption"], "Final caption");
        assert_eq!(body["post"]["tags"], json!(["a", "b"]));

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Ok");
    }

    async fn seed_posts(backend: &RecordingBackend, count: usize) {
        for n in 0..count {
            backend
                .inner()
                .create_document(
                    Collection::Posts,
                    &format!("p{n}"),
                    json!({ "caption": format!("post {n}"), "creator": "someone-else" }),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn save_toggle_finds_old_saves() {
        let (backend, app) = app();
        send(&app, Method::POST, "/sign-up", Some(signup_body())).await;
        seed_posts(&backend, 26).await;

        for n in 0..26 {
            let (_, body) = send(&app, Method::POST, &format!("/posts/p{n}/save"), None).await;
            assert_eq!(body["saved"], true, "p{n}");
        }

        let (status, body) = send(&app, Method::POST, "/posts/p0/save", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["saved"], false);

        let remaining = backend
            .inner()
            .list_documents(Collection::Saves, &[Query::equal("post", "p0")])
            .await
            .unwrap();
        assert_eq!(remaining.total, 0);
    }

    #[tokio::test]
    async fn only_owner_may_delete_a_save() {
        let (backend, app) = app();
        send(&app, Method::POST, "/sign-up", Some(signup_body())).await;
        seed_posts(&backend, 1).await;

        backend
            .inner()
            .create_document(
                Collection::Saves,
                "s-foreign",
                json!({ "user": "someone-else", "post": "p0" }),
            )
            .await
            .unwrap();
        let (status, _) = send(&app, Method::DELETE, "/saves/s-foreign", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, saved) = send(&app, Method::POST, "/posts/p0/save", None).await;
        let own = saved["record"]["$id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, Method::DELETE, &format!("/saves/{own}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Ok");

        let (status, _) = send(&app, Method::DELETE, &format!("/saves/{own}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
