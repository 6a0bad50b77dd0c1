//! Test double that records every backend call and can be told to fail.

use crate::backend::{
    Backend, BackendError, Collection, MIN_HASH_COST, MemoryBackend, Query, Result,
};
use crate::models::{Account, DocumentList, Session};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::num::NonZeroU32;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub operation: &'static str,
    pub collection: Option<Collection>,
    pub queries: Vec<Query>,
}

/// Wraps a [`MemoryBackend`], logging calls in order. Operations named in
/// `fail` return a transport error without touching the inner backend.
pub struct RecordingBackend {
    inner: MemoryBackend,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new("test-secret", NonZeroU32::new(1000).unwrap())
                .with_hash_cost(MIN_HASH_COST),
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|call| call.operation).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    fn record(
        &self,
        operation: &'static str,
        collection: Option<Collection>,
        queries: &[Query],
    ) -> Result<()> {
        self.calls.lock().unwrap().push(Call {
            operation,
            collection,
            queries: queries.to_vec(),
        });
        if self.failing.lock().unwrap().contains(operation) {
            return Err(BackendError::Transport(format!("{operation} scripted to fail")));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn create_account(
        &self,
        id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account> {
        self.record("create_account", None, &[])?;
        self.inner.create_account(id, email, password, name).await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> Result<Session> {
        self.record("create_email_session", None, &[])?;
        self.inner.create_email_session(email, password).await
    }

    async fn get_account(&self) -> Result<Account> {
        self.record("get_account", None, &[])?;
        self.inner.get_account().await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.record("delete_session", None, &[])?;
        self.inner.delete_session(session_id).await
    }

    fn avatar_initials(&self, name: &str) -> String {
        self.inner.avatar_initials(name)
    }

    async fn create_document(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        self.record("create_document", Some(collection), &[])?;
        self.inner.create_document(collection, id, data).await
    }

    async fn get_document(&self, collection: Collection, id: &str) -> Result<Value> {
        self.record("get_document", Some(collection), &[])?;
        self.inner.get_document(collection, id).await
    }

    async fn update_document(
        &self,
        collection: Collection,
        id: &str,
        data: Value,
    ) -> Result<Value> {
        self.record("update_document", Some(collection), &[])?;
        self.inner.update_document(collection, id, data).await
    }

    async fn delete_document(&self, collection: Collection, id: &str) -> Result<()> {
        self.record("delete_document", Some(collection), &[])?;
        self.inner.delete_document(collection, id).await
    }

    async fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<DocumentList<Value>> {
        self.record("list_documents", Some(collection), queries)?;
        self.inner.list_documents(collection, queries).await
    }
}
