use super::{Document, null_as_empty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile document stored in the users collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub account_id: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Sentinel for "nobody signed in".
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.email.is_empty()
    }
}

impl Document for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Sign-up input handed to the wrapper layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of the users-collection document written after account creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserDocument {
    pub account_id: String,
    pub email: String,
    pub name: String,
    pub image_url: String,
    pub username: String,
}
