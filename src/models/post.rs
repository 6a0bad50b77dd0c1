use super::{DocRef, Document, User, null_as_empty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub caption: String,
    pub creator: DocRef<User>,
    #[serde(default)]
    pub likes: Vec<DocRef<User>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Ids of the users who liked this post.
    pub fn like_ids(&self) -> Vec<String> {
        self.likes.iter().map(|like| like.id().to_string()).collect()
    }
}

impl Document for Post {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Record in the saves collection linking a user to a bookmarked post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Save {
    #[serde(rename = "$id")]
    pub id: String,
    pub user: DocRef<User>,
    pub post: DocRef<Post>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub creator: String,
    pub caption: String,
    pub location: String,
    pub tags: Vec<String>,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    pub caption: String,
    pub location: String,
    pub tags: Vec<String>,
    pub image_url: String,
}
