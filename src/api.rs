//! Wrapper layer over the remote backend.
//!
//! Each function issues one logical remote call and returns `Some(result)`
//! or, after logging the failure, `None`. Callers only learn *that* an
//! operation failed; there is no retry and no error taxonomy at this level.

use crate::backend::{
    Backend, BackendError, CREATED_AT, CURRENT_SESSION, Collection, Query, UPDATED_AT, unique_id,
};
use crate::models::{
    Account, DocumentList, NewPost, NewUser, NewUserDocument, Post, Save, Session, UpdatePost, User,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Posts per page of the infinite feed.
pub const INFINITE_POSTS_PAGE_SIZE: usize = 9;
/// Posts shown on the home feed.
pub const RECENT_POSTS_LIMIT: usize = 20;
/// Creators listed next to the home feed.
pub const HOME_CREATORS_LIMIT: usize = 10;

type Result<T> = std::result::Result<T, BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteStatus {
    pub status: &'static str,
}

impl DeleteStatus {
    pub const OK: DeleteStatus = DeleteStatus { status: "Ok" };
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    Ok(serde_json::from_value(value)?)
}

fn decode_list<T: DeserializeOwned>(list: DocumentList<Value>) -> Result<DocumentList<T>> {
    Ok(DocumentList {
        total: list.total,
        documents: list
            .documents
            .into_iter()
            .map(decode)
            .collect::<Result<_>>()?,
    })
}

/// Log and swallow.
fn settle<T>(operation: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            error!(operation, error = %e, "Remote call failed");
            None
        }
    }
}

/// Queries for one page of the infinite feed. The cursor filter is added only
/// when a non-empty cursor is supplied.
pub fn infinite_posts_queries(cursor: Option<&str>) -> Vec<Query> {
    let mut queries = vec![
        Query::order_desc(UPDATED_AT),
        Query::limit(INFINITE_POSTS_PAGE_SIZE),
    ];
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
        queries.push(Query::cursor_after(cursor));
    }
    queries
}

#[derive(Clone)]
pub struct Api {
    backend: Arc<dyn Backend>,
}

impl Api {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    // ========================================================================
    // AUTH
    // ========================================================================

    /// Create the auth account, then the matching profile document.
    ///
    /// No compensation happens if the profile write fails after the account
    /// was created.
    pub async fn create_user_account(&self, user: NewUser) -> Option<User> {
        let result = async {
            let account = self
                .backend
                .create_account(&unique_id(), &user.email, &user.password, &user.name)
                .await?;

            let image_url = self.backend.avatar_initials(&user.name);

            self.save_user(NewUserDocument {
                account_id: account.id,
                email: account.email,
                name: account.name,
                image_url,
                username: user.username,
            })
            .await
        }
        .await;

        let user = settle("create_user_account", result)?;
        info!("New user registered: {}", user.email);
        Some(user)
    }

    async fn save_user(&self, user: NewUserDocument) -> Result<User> {
        let document = self
            .backend
            .create_document(Collection::Users, &unique_id(), serde_json::to_value(user)?)
            .await?;
        decode(document)
    }

    pub async fn save_user_to_db(&self, user: NewUserDocument) -> Option<User> {
        settle("save_user_to_db", self.save_user(user).await)
    }

    pub async fn sign_in_account(&self, email: &str, password: &str) -> Option<Session> {
        settle(
            "sign_in_account",
            self.backend.create_email_session(email, password).await,
        )
    }

    pub async fn get_account(&self) -> Option<Account> {
        settle("get_account", self.backend.get_account().await)
    }

    /// Profile document of the account behind the current session.
    pub async fn get_current_user(&self) -> Option<User> {
        let account = self.get_account().await?;

        let result = async {
            let list = self
                .backend
                .list_documents(Collection::Users, &[Query::equal("accountId", &account.id)])
                .await?;
            decode_list::<User>(list)
        }
        .await;

        let user = settle("get_current_user", result)?.documents.into_iter().next();
        if user.is_none() {
            warn!(account_id = %account.id, "No profile document for account");
        }
        user
    }

    pub async fn sign_out_account(&self) -> Option<()> {
        settle(
            "sign_out_account",
            self.backend.delete_session(CURRENT_SESSION).await,
        )
    }

    // ========================================================================
    // POSTS
    // ========================================================================

    pub async fn create_post(&self, post: NewPost) -> Option<Post> {
        if post.creator.is_empty() {
            warn!("Refusing to create a post without a creator");
            return None;
        }

        let result = async {
            let document = self
                .backend
                .create_document(Collection::Posts, &unique_id(), serde_json::to_value(post)?)
                .await?;
            decode(document)
        }
        .await;

        settle("create_post", result)
    }

    pub async fn get_post_by_id(&self, post_id: &str) -> Option<Post> {
        let result = async { decode(self.backend.get_document(Collection::Posts, post_id).await?) };
        settle("get_post_by_id", result.await)
    }

    pub async fn update_post(&self, post_id: &str, post: UpdatePost) -> Option<Post> {
        let result = async {
            let document = self
                .backend
                .update_document(Collection::Posts, post_id, serde_json::to_value(post)?)
                .await?;
            decode(document)
        }
        .await;

        settle("update_post", result)
    }

    pub async fn delete_post(&self, post_id: &str) -> Option<DeleteStatus> {
        settle(
            "delete_post",
            self.backend.delete_document(Collection::Posts, post_id).await,
        )
        .map(|()| DeleteStatus::OK)
    }

    /// Full-text search on captions. The term is forwarded as typed.
    pub async fn search_posts(&self, search_term: &str) -> Option<DocumentList<Post>> {
        self.list_posts("search_posts", &[Query::search("caption", search_term)])
            .await
    }

    pub async fn get_infinite_posts(&self, cursor: Option<&str>) -> Option<DocumentList<Post>> {
        self.list_posts("get_infinite_posts", &infinite_posts_queries(cursor))
            .await
    }

    pub async fn get_recent_posts(&self) -> Option<DocumentList<Post>> {
        let queries = [Query::order_desc(CREATED_AT), Query::limit(RECENT_POSTS_LIMIT)];
        self.list_posts("get_recent_posts", &queries).await
    }

    pub async fn get_user_posts(&self, user_id: Option<&str>) -> Option<DocumentList<Post>> {
        let user_id = user_id.filter(|id| !id.is_empty())?;
        let queries = [Query::equal("creator", user_id), Query::order_desc(CREATED_AT)];
        self.list_posts("get_user_posts", &queries).await
    }

    async fn list_posts(&self, operation: &str, queries: &[Query]) -> Option<DocumentList<Post>> {
        let result = async {
            decode_list(
                self.backend
                    .list_documents(Collection::Posts, queries)
                    .await?,
            )
        };
        settle(operation, result.await)
    }

    /// Replace the like list of a post with `likes`.
    pub async fn like_post(&self, post_id: &str, likes: &[String]) -> Option<Post> {
        let result = async {
            let document = self
                .backend
                .update_document(Collection::Posts, post_id, json!({ "likes": likes }))
                .await?;
            decode(document)
        }
        .await;

        settle("like_post", result)
    }

    pub async fn save_post(&self, user_id: &str, post_id: &str) -> Option<Save> {
        let result = async {
            let document = self
                .backend
                .create_document(
                    Collection::Saves,
                    &unique_id(),
                    json!({ "user": user_id, "post": post_id }),
                )
                .await?;
            decode(document)
        }
        .await;

        settle("save_post", result)
    }

    pub async fn delete_saved_post(&self, saved_record_id: &str) -> Option<DeleteStatus> {
        settle(
            "delete_saved_post",
            self.backend
                .delete_document(Collection::Saves, saved_record_id)
                .await,
        )
        .map(|()| DeleteStatus::OK)
    }

    pub async fn get_saved_posts(&self, user_id: &str) -> Option<DocumentList<Save>> {
        let queries = [Query::equal("user", user_id), Query::order_desc(CREATED_AT)];
        let result = async {
            decode_list(
                self.backend
                    .list_documents(Collection::Saves, &queries)
                    .await?,
            )
        };
        settle("get_saved_posts", result.await)
    }

    /// The user's save record for one post, if any.
    pub async fn find_saved_post(&self, user_id: &str, post_id: &str) -> Option<Option<Save>> {
        let queries = [
            Query::equal("user", user_id),
            Query::equal("post", post_id),
            Query::limit(1),
        ];
        let result = async {
            decode_list::<Save>(
                self.backend
                    .list_documents(Collection::Saves, &queries)
                    .await?,
            )
        };
        settle("find_saved_post", result.await).map(|list| list.documents.into_iter().next())
    }

    pub async fn get_saved_record_by_id(&self, saved_record_id: &str) -> Option<Save> {
        let result = async {
            decode(
                self.backend
                    .get_document(Collection::Saves, saved_record_id)
                    .await?,
            )
        };
        settle("get_saved_record_by_id", result.await)
    }

    // ========================================================================
    // USERS
    // ========================================================================

    pub async fn get_users(&self, limit: Option<usize>) -> Option<DocumentList<User>> {
        let mut queries = vec![Query::order_desc(CREATED_AT)];
        if let Some(limit) = limit.filter(|n| *n > 0) {
            queries.push(Query::limit(limit));
        }

        let result = async {
            decode_list(
                self.backend
                    .list_documents(Collection::Users, &queries)
                    .await?,
            )
        };
        settle("get_users", result.await)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Option<User> {
        let result = async { decode(self.backend.get_document(Collection::Users, user_id).await?) };
        settle("get_user_by_id", result.await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    fn setup() -> (Arc<RecordingBackend>, Api) {
        let backend = Arc::new(RecordingBackend::new());
        let api = Api::new(backend.clone());
        (backend, api)
    }

    fn ada() -> NewUser {
        NewUser {
            name: "Ada Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "password123".into(),
        }
    }

    async fn signed_in(api: &Api) -> User {
        api.create_user_account(ada()).await.unwrap();
        api.sign_in_account("ada@example.com", "password123")
            .await
            .unwrap();
        api.get_current_user().await.unwrap()
    }

    fn new_post(creator: &str, caption: &str) -> NewPost {
        NewPost {
            creator: creator.into(),
            caption: caption.into(),
            location: "London".into(),
            tags: vec!["math".into()],
            image_url: String::new(),
        }
    }

    #[test]
    fn infinite_queries_carry_cursor_only_when_given() {
        assert_eq!(
            infinite_posts_queries(None),
            vec![Query::order_desc("$updatedAt"), Query::limit(9)]
        );
        assert_eq!(infinite_posts_queries(Some("")), infinite_posts_queries(None));
        assert_eq!(
            infinite_posts_queries(Some("p9")),
            vec![
                Query::order_desc("$updatedAt"),
                Query::limit(9),
                Query::cursor_after("p9"),
            ]
        );
    }

    #[tokio::test]
    async fn create_user_account_writes_profile_document() {
        let (backend, api) = setup();
        let user = api.create_user_account(ada()).await.unwrap();

        assert_eq!(user.username, "ada");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.image_url, "/avatars/initials/AL");
        assert!(!user.account_id.is_empty());
        assert_eq!(backend.operations(), vec!["create_account", "create_document"]);
    }

    #[tokio::test]
    async fn create_user_account_failure_is_none() {
        let (backend, api) = setup();
        backend.fail("create_account");

        assert!(api.create_user_account(ada()).await.is_none());
        assert_eq!(backend.operations(), vec!["create_account"]);
    }

    #[tokio::test]
    async fn current_user_requires_session() {
        let (_, api) = setup();
        api.create_user_account(ada()).await.unwrap();
        assert!(api.get_current_user().await.is_none());

        let user = signed_in_again(&api).await;
        assert_eq!(user.email, "ada@example.com");
    }

    async fn signed_in_again(api: &Api) -> User {
        api.sign_in_account("ada@example.com", "password123")
            .await
            .unwrap();
        api.get_current_user().await.unwrap()
    }

    #[tokio::test]
    async fn current_user_looks_up_by_account_id() {
        let (backend, api) = setup();
        let user = signed_in(&api).await;
        backend.clear();

        assert_eq!(api.get_current_user().await.unwrap(), user);
        let calls = backend.calls();
        assert_eq!(calls[0].operation, "get_account");
        assert_eq!(
            calls[1].queries,
            vec![Query::equal("accountId", &user.account_id)]
        );
    }

    #[tokio::test]
    async fn sign_out_ends_session() {
        let (_, api) = setup();
        signed_in(&api).await;

        assert!(api.sign_out_account().await.is_some());
        assert!(api.get_account().await.is_none());
        assert!(api.sign_out_account().await.is_none());
    }

    #[tokio::test]
    async fn search_passes_term_unmodified() {
        let (backend, api) = setup();
        let user = signed_in(&api).await;
        api.create_post(new_post(&user.id, "Sunset  over *THE* sea"))
            .await
            .unwrap();
        backend.clear();

        api.search_posts("  *THE* sea ").await.unwrap();
        assert_eq!(
            backend.calls()[0].queries,
            vec![Query::Search("caption".into(), "  *THE* sea ".into())]
        );
    }

    #[tokio::test]
    async fn infinite_posts_page_through_feed() {
        let (_, api) = setup();
        let user = signed_in(&api).await;
        for i in 0..12 {
            api.create_post(new_post(&user.id, &format!("post number {i}")))
                .await
                .unwrap();
        }

        let first = api.get_infinite_posts(None).await.unwrap();
        assert_eq!(first.documents.len(), INFINITE_POSTS_PAGE_SIZE);
        assert_eq!(first.total, 12);
        assert_eq!(first.documents[0].caption, "post number 11");

        let last_id = first.documents.last().unwrap().id.clone();
        let second = api.get_infinite_posts(Some(&last_id)).await.unwrap();
        assert_eq!(second.documents.len(), 3);
        assert_eq!(second.documents[2].caption, "post number 0");
    }

    #[tokio::test]
    async fn user_posts_without_id_makes_no_call() {
        let (backend, api) = setup();
        assert!(api.get_user_posts(None).await.is_none());
        assert!(api.get_user_posts(Some("")).await.is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn user_posts_filters_by_creator() {
        let (backend, api) = setup();
        let user = signed_in(&api).await;
        api.create_post(new_post(&user.id, "mine")).await.unwrap();
        api.create_post(new_post("someone-else", "theirs"))
            .await
            .unwrap();
        backend.clear();

        let posts = api.get_user_posts(Some(&user.id)).await.unwrap();
        assert_eq!(posts.total, 1);
        assert_eq!(posts.documents[0].caption, "mine");
        assert_eq!(
            backend.calls()[0].queries,
            vec![Query::equal("creator", &user.id), Query::order_desc("$createdAt")]
        );
    }

    #[tokio::test]
    async fn post_without_creator_makes_no_call() {
        let (backend, api) = setup();
        assert!(api.create_post(new_post("", "nobody's")).await.is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn like_replaces_like_list() {
        let (_, api) = setup();
        let user = signed_in(&api).await;
        let post = api.create_post(new_post(&user.id, "likeable")).await.unwrap();

        let liked = api
            .like_post(&post.id, &[user.id.clone(), "u2".into()])
            .await
            .unwrap();
        assert_eq!(liked.like_ids(), vec![user.id.clone(), "u2".to_string()]);

        let unliked = api.like_post(&post.id, &[]).await.unwrap();
        assert!(unliked.likes.is_empty());
    }

    #[tokio::test]
    async fn save_and_unsave() {
        let (_, api) = setup();
        let user = signed_in(&api).await;
        let post = api.create_post(new_post(&user.id, "keep")).await.unwrap();

        let save = api.save_post(&user.id, &post.id).await.unwrap();
        assert_eq!(save.post.id(), post.id);
        assert_eq!(api.get_saved_posts(&user.id).await.unwrap().total, 1);
        assert_eq!(api.get_saved_record_by_id(&save.id).await, Some(save.clone()));

        assert_eq!(api.delete_saved_post(&save.id).await, Some(DeleteStatus::OK));
        assert!(api.delete_saved_post(&save.id).await.is_none());
        assert_eq!(api.get_saved_posts(&user.id).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn find_saved_post_looks_past_first_page() {
        let (backend, api) = setup();
        let oldest = api.create_post(new_post("u1", "first ever")).await.unwrap();
        let first_save = api.save_post("u1", &oldest.id).await.unwrap();
        for n in 0..30 {
            let post = api.create_post(new_post("u1", &format!("later {n}"))).await.unwrap();
            api.save_post("u1", &post.id).await.unwrap();
        }
        assert!(
            !api.get_saved_posts("u1")
                .await
                .unwrap()
                .documents
                .iter()
                .any(|save| save.id == first_save.id)
        );

        backend.clear();
        let found = api.find_saved_post("u1", &oldest.id).await.unwrap();
        assert_eq!(found.map(|save| save.id), Some(first_save.id));
        assert_eq!(
            backend.calls()[0].queries,
            vec![
                Query::equal("user", "u1"),
                Query::equal("post", oldest.id.as_str()),
                Query::limit(1),
            ]
        );
        assert_eq!(api.find_saved_post("u2", &oldest.id).await, Some(None));
    }

    #[tokio::test]
    async fn post_update_and_delete() {
        let (_, api) = setup();
        let user = signed_in(&api).await;
        let post = api.create_post(new_post(&user.id, "draft")).await.unwrap();

        let updated = api
            .update_post(
                &post.id,
                UpdatePost {
                    caption: "final".into(),
                    location: "Paris".into(),
                    tags: vec![],
                    image_url: String::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.caption, "final");
        assert_eq!(api.get_post_by_id(&post.id).await.unwrap().location, "Paris");

        assert_eq!(api.delete_post(&post.id).await, Some(DeleteStatus::OK));
        assert!(api.get_post_by_id(&post.id).await.is_none());
    }

    #[tokio::test]
    async fn get_users_adds_limit_only_when_given() {
        let (backend, api) = setup();
        api.get_users(None).await.unwrap();
        api.get_users(Some(10)).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls[0].queries, vec![Query::order_desc("$createdAt")]);
        assert_eq!(
            calls[1].queries,
            vec![Query::order_desc("$createdAt"), Query::limit(10)]
        );
    }

    #[tokio::test]
    async fn failures_become_none() {
        let (backend, api) = setup();
        backend.fail("list_documents");
        backend.fail("get_document");

        assert!(api.get_recent_posts().await.is_none());
        assert!(api.get_users(Some(5)).await.is_none());
        assert!(api.get_user_by_id("u1").await.is_none());
    }
}
