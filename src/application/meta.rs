//! # Meta Store
//!
//! Cross-command scratch state shared by every action. Values are stored as JSON and
//! decoded into the caller's type on read, so a type mismatch surfaces as a [`MetaError`]
//! instead of a bad cast. Entries never expire.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum MetaError {
    #[error("unable to encode meta value '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("meta value '{key}' has an unexpected type: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct MetaStore {
    entries: RwLock<HashMap<String, Value>>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, returning whether an entry was replaced.
    pub async fn set<T: Serialize>(&self, key: &str, value: T) -> Result<bool, MetaError> {
        let value = serde_json::to_value(value).map_err(|source| MetaError::Encode {
            key: key.to_string(),
            source,
        })?;
        let mut guard = self.entries.write().await;
        Ok(guard.insert(key.to_string(), value).is_some())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, MetaError> {
        let guard = self.entries.read().await;
        let Some(value) = guard.get(key) else {
            return Ok(None);
        };
        serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| MetaError::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Raw JSON value, for callers that branch on the stored shape.
    pub async fn get_raw(&self, key: &str) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Counter {
        hits: u32,
        last: String,
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let store = MetaStore::new();
        assert!(!store.set("message", "hello").await.unwrap());
        assert_eq!(
            store.get::<String>("message").await.unwrap().as_deref(),
            Some("hello")
        );

        let counter = Counter {
            hits: 3,
            last: "alice".into(),
        };
        store.set("counter", &counter).await.unwrap();
        assert_eq!(store.get::<Counter>("counter").await.unwrap(), Some(counter));
        assert_eq!(store.keys().await, vec!["counter", "message"]);
    }

    #[tokio::test]
    async fn test_type_mismatch_is_an_error() {
        let store = MetaStore::new();
        store.set("message", "hello").await.unwrap();
        let err = store.get::<u64>("message").await.unwrap_err();
        assert!(matches!(err, MetaError::Decode { .. }));
        assert!(err.to_string().contains("message"));
    }

    #[tokio::test]
    async fn test_overwrite_and_remove() {
        let store = MetaStore::new();
        assert_eq!(store.get::<String>("missing").await.unwrap(), None);
        store.set("k", 1).await.unwrap();
        assert!(store.set("k", 2).await.unwrap());
        assert_eq!(store.get::<i32>("k").await.unwrap(), Some(2));
        assert!(store.remove("k").await);
        assert!(!store.remove("k").await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let store = Arc::new(MetaStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(&format!("key-{i}"), i).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 32);
        assert_eq!(store.get::<i32>("key-17").await.unwrap(), Some(17));
    }
}
