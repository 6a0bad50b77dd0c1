mod account;
mod post;
mod user;

pub use account::{Account, Session};
pub use post::{NewPost, Post, Save, UpdatePost};
pub use user::{NewUser, NewUserDocument, User};

use serde::{Deserialize, Deserializer, Serialize};

/// A remote document that can be referenced by id.
pub trait Document {
    fn id(&self) -> &str;
}

/// Relationship attribute: the service returns either the bare id or the
/// expanded related document depending on the collection setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocRef<T> {
    Id(String),
    Document(Box<T>),
}

impl<T: Document> DocRef<T> {
    pub fn id(&self) -> &str {
        match self {
            DocRef::Id(id) => id,
            DocRef::Document(doc) => doc.id(),
        }
    }
}

/// Paged result of a `list_documents` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

impl<T> DocumentList<T> {
    pub fn empty() -> Self {
        Self {
            total: 0,
            documents: Vec::new(),
        }
    }
}

/// Optional string attributes come back as `null` when unset.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
