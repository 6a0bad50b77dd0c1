use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authentication account owned by the remote auth service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Opaque session handle. The client never reads the secret; the service
/// tracks the active session through its cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub expire: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current: bool,
}
