//! Document datastore abstraction.
//!
//! Entities are JSON documents addressed by collection name; filters are
//! equality matches on top-level keys. The trait is object-safe so tests
//! can swap in failure-injecting backends.

use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::errors::CampusError;

/// Equality filter over top-level document keys.
pub type Filter = Map<String, Value>;

/// Convenience for a single-key equality filter.
pub fn filter_eq(key: &str, value: impl Into<Value>) -> Filter {
    let mut filter = Filter::new();
    filter.insert(key.to_string(), value.into());
    filter
}

/// Backing store for JSON documents.
///
/// Single-document operations only; the store's per-document atomicity is
/// all the concurrency this system relies on.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Insert a document, assigning an `id` if it has none. Returns the
    /// stored document.
    async fn insert(&self, collection: &str, document: Value) -> Result<Value>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>>;

    /// Merge `changes` into the first matching document. Returns the
    /// updated document, or None if nothing matched.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: &Filter,
    ) -> Result<Option<Value>>;

    /// Remove and return the first matching document.
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize>;
}

pub fn matches_filter(document: &Value, filter: &Filter) -> bool {
    filter.iter().all(|(key, value)| document.get(key) == Some(value))
}

/// In-memory backend for development and tests.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Value) -> Result<Value> {
        let Some(map) = document.as_object_mut() else {
            return Err(CampusError::bad_request("Documents must be JSON objects").into_anyhow());
        };
        if !map.contains_key("id") {
            map.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        let mut collections = self.collections.write().unwrap();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(document.clone());
        Ok(document)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Value>> {
        let collections = self.collections.read().unwrap();
        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| matches_filter(d, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        let collections = self.collections.read().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.iter().find(|d| matches_filter(d, filter)).cloned()))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        changes: &Filter,
    ) -> Result<Option<Value>> {
        let mut collections = self.collections.write().unwrap();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(document) = documents.iter_mut().find(|d| matches_filter(d, filter)) else {
            return Ok(None);
        };

        if let Some(map) = document.as_object_mut() {
            for (key, value) in changes {
                map.insert(key.clone(), value.clone());
            }
        }
        Ok(Some(document.clone()))
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<Option<Value>> {
        let mut collections = self.collections.write().unwrap();
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(position) = documents.iter().position(|d| matches_filter(d, filter)) else {
            return Ok(None);
        };
        Ok(Some(documents.remove(position)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<usize> {
        let collections = self.collections.read().unwrap();
        Ok(collections
            .get(collection)
            .map(|documents| documents.iter().filter(|d| matches_filter(d, filter)).count())
            .unwrap_or(0))
    }
}
