//! In-process stand-in for the hosted backend.
//!
//! Accounts, sessions and documents live in `DashMap`s; passwords are
//! bcrypt-hashed and the active session is a signed JWT held the way a
//! browser holds the session cookie. Used for local development and tests.

mod filter;
mod token;

use super::{Backend, BackendError, CURRENT_SESSION, Collection, Query, Result};
use crate::models::{Account, DocumentList, Session};
use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, SecondsFormat, Utc};
use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Lowest cost bcrypt accepts; fast enough for tests.
pub const MIN_HASH_COST: u32 = 4;

#[derive(Debug, Clone)]
struct StoredAccount {
    id: String,
    email: String,
    name: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
}

impl From<&StoredAccount> for Account {
    fn from(account: &StoredAccount) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            name: account.name.clone(),
            created_at: Some(account.created_at),
        }
    }
}

pub struct MemoryBackend {
    accounts: Arc<DashMap<String, StoredAccount>>,
    email_index: Arc<DashMap<String, String>>, // Quick Lookup by Email
    /// Live session id -> account id
    sessions: Arc<DashMap<String, String>>,
    users: Arc<DashMap<String, Value>>,
    posts: Arc<DashMap<String, Value>>,
    saves: Arc<DashMap<String, Value>>,
    current_session: RwLock<Option<String>>,
    session_secret: String,
    hash_cost: u32,
    sequence: AtomicU64,
    login_limiter: DefaultDirectRateLimiter,
}

impl MemoryBackend {
    /// `logins_per_minute` caps session creation, mirroring the hosted
    /// service's abuse limits.
    pub fn new(session_secret: impl Into<String>, logins_per_minute: NonZeroU32) -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            email_index: Arc::new(DashMap::new()),
            sessions: Arc::new(DashMap::new()),
            users: Arc::new(DashMap::new()),
            posts: Arc::new(DashMap::new()),
            saves: Arc::new(DashMap::new()),
            current_session: RwLock::new(None),
            session_secret: session_secret.into(),
            hash_cost: DEFAULT_COST,
            sequence: AtomicU64::new(0),
            login_limiter: RateLimiter::direct(Quota::per_minute(logins_per_minute)),
        }
    }

    /// Override the bcrypt cost.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    fn collection(&self, collection: Collection) -> &DashMap<String, Value> {
        match collection {
            Collection::Users => &self.users,
            Collection::Posts => &self.posts,
            Collection::Saves => &self.saves,
        }
    }

    /// Resolve the held session token to `(session id, account id)`.
    async fn current(&self) -> Result<(String, String)> {
        let guard = self.current_session.read().await;
        let token = guard.as_deref().ok_or_else(|| {
            BackendError::Unauthorized("User (role: guests) missing scope (account)".into())
        })?;

        let claims = token::validate_token(token, &self.session_secret)?;
        if !self.sessions.contains_key(&claims.sid) {
            return Err(BackendError::Unauthorized("Session has been deleted".into()));
        }
        Ok((claims.sid, claims.sub))
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, false)
}

fn into_object(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(BackendError::BadRequest(format!(
            "Document data must be an object, got {other}"
        ))),
    }
}

/// Presence checks the remote collections enforce through required attributes.
fn check_required(collection: Collection, data: &Map<String, Value>) -> Result<()> {
    let required: &[&str] = match collection {
        Collection::Users => &["accountId", "email"],
        Collection::Posts => &["creator"],
        Collection::Saves => &["user", "post"],
    };
    for attribute in required {
        let present = match data.get(*attribute) {
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        if !present {
            return Err(BackendError::BadRequest(format!(
                "Invalid document structure: Missing required attribute \"{attribute}\""
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn create_account(
        &self,
        id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(BackendError::BadRequest(
                "Password must be between 8 and 256 characters long.".into(),
            ));
        }
        if self.email_index.contains_key(email) || self.accounts.contains_key(id) {
            return Err(BackendError::Conflict(
                "A user with the same id, email, or phone already exists in this project.".into(),
            ));
        }

        let hashed_password = hash(password, self.hash_cost)
            .map_err(|e| BackendError::Internal(format!("Password hashing failed: {}", e)))?;

        let account = StoredAccount {
            id: id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            hashed_password,
            created_at: Utc::now(),
        };

        self.email_index.insert(account.email.clone(), account.id.clone());
        self.accounts.insert(account.id.clone(), account.clone());

        info!("New account registered: {}", account.email);

        Ok(Account::from(&account))
    }

    async fn create_email_session(&self, email: &str, password: &str) -> Result<Session> {
        if self.login_limiter.check().is_err() {
            warn!("Session creation rate limit exceeded");
            return Err(BackendError::RateLimited(
                "Rate limit for the current endpoint has been exceeded.".into(),
            ));
        }

        let invalid = || {
            BackendError::Unauthorized(
                "Invalid credentials. Please check the email and password.".into(),
            )
        };

        // Find account by email
        let account_id = self
            .email_index
            .get(email)
            .map(|id| id.clone())
            .ok_or_else(invalid)?;
        let account = self
            .accounts
            .get(&account_id)
            .map(|account| account.clone())
            .ok_or_else(invalid)?;

        // Verify password
        let valid = verify(password, &account.hashed_password)
            .map_err(|e| BackendError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(invalid());
        }

        let session_id = super::unique_id();
        let (token, expire) =
            token::create_token(&account.id, &session_id, &account.email, &self.session_secret)?;

        self.sessions.insert(session_id.clone(), account.id.clone());
        *self.current_session.write().await = Some(token);

        info!("Session created for {}", account.email);

        Ok(Session {
            id: session_id,
            user_id: account.id,
            expire: Some(expire),
            current: true,
        })
    }

    async fn get_account(&self) -> Result<Account> {
        let (_, account_id) = self.current().await?;
        self.accounts
            .get(&account_id)
            .map(|account| Account::from(account.value()))
            .ok_or_else(|| {
                BackendError::NotFound("User with the requested ID could not be found.".into())
            })
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let (current_id, account_id) = self.current().await?;

        if session_id == CURRENT_SESSION || session_id == current_id {
            self.sessions.remove(&current_id);
            *self.current_session.write().await = None;
            info!("Session {} deleted", current_id);
            return Ok(());
        }

        match self.sessions.get(session_id).map(|owner| owner.clone()) {
            Some(owner) if owner == account_id => {
                self.sessions.remove(session_id);
                info!("Session {} deleted", session_id);
                Ok(())
            }
            _ => Err(BackendError::NotFound(
                "The current user session could not be found.".into(),
            )),
        }
    }

    fn avatar_initials(&self, name: &str) -> String {
        let initials: String = name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect();
        format!("/avatars/initials/{initials}")
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        let mut document = into_object(data)?;
        check_required(collection, &document)?;

        let store = self.collection(collection);
        if store.contains_key(id) {
            return Err(BackendError::Conflict(
                "Document with the requested ID already exists.".into(),
            ));
        }

        let timestamp = now();
        document.insert("$id".into(), Value::from(id));
        document.insert("$collectionId".into(), Value::from(collection.name()));
        document.insert("$createdAt".into(), Value::from(timestamp.clone()));
        document.insert("$updatedAt".into(), Value::from(timestamp));
        document.insert(
            filter::SEQUENCE.into(),
            Value::from(self.sequence.fetch_add(1, Ordering::SeqCst)),
        );

        let document = Value::Object(document);
        store.insert(id.to_string(), document.clone());

        debug!(collection = collection.name(), id = %id, "Document created");

        Ok(document)
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value> {
        self.collection(collection)
            .get(id)
            .map(|doc| doc.clone())
            .ok_or_else(|| {
                BackendError::NotFound("Document with the requested ID could not be found.".into())
            })
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        let changes = into_object(data)?;

        let mut entry = self.collection(collection).get_mut(id).ok_or_else(|| {
            BackendError::NotFound("Document with the requested ID could not be found.".into())
        })?;
        let Value::Object(document) = entry.value_mut() else {
            return Err(BackendError::Internal(format!("Stored document {id} is not an object")));
        };

        for (key, value) in changes {
            // System attributes are owned by the service
            if !key.starts_with('$') {
                document.insert(key, value);
            }
        }
        document.insert("$updatedAt".into(), Value::from(now()));

        debug!(collection = collection.name(), id = %id, "Document updated");

        Ok(entry.value().clone())
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
        if self.collection(collection).remove(id).is_none() {
            return Err(BackendError::NotFound(
                "Document with the requested ID could not be found.".into(),
            ));
        }

        debug!(collection = collection.name(), id = %id, "Document deleted");

        Ok(())
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList<Value>> {
        let documents: Vec<Value> = self
            .collection(collection)
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        filter::apply(documents, queries)
    }
}
