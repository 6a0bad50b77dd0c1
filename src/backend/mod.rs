//! Remote backend client.
//!
//! Everything that talks to the hosted backend-as-a-service goes through the
//! [`Backend`] trait: account and session management, and document CRUD with
//! query primitives across the users, posts and saves collections.

mod appwrite;
mod error;
mod memory;
mod query;

pub use appwrite::{AppwriteBackend, AppwriteConfig};
pub use error::{BackendError, Result};
pub use memory::{MIN_HASH_COST, MemoryBackend};
pub use query::{CREATED_AT, Query, UPDATED_AT};

use crate::models::{Account, DocumentList, Session};
use async_trait::async_trait;
use serde_json::Value;

/// Session id that addresses whichever session the client currently holds.
pub const CURRENT_SESSION: &str = "current";

/// Document collections used by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Posts,
    Saves,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Posts => "posts",
            Collection::Saves => "saves",
        }
    }
}

/// Generate a document or account id the remote service will accept
/// (at most 36 chars of `[a-z0-9]`).
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn create_account(
        &self,
        id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account>;

    async fn create_email_session(&self, email: &str, password: &str) -> Result<Session>;

    async fn get_account(&self) -> Result<Account>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// URL of a generated initials avatar. Built locally, no request made.
    fn avatar_initials(&self, name: &str) -> String;

    async fn create_document(&self, collection: Collection, id: &str, data: Value)
    -> Result<Value>;

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value>;

    async fn update_document(&self, collection: Collection, id: &str, data: Value)
    -> Result<Value>;

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()>;

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList<Value>>;
}
