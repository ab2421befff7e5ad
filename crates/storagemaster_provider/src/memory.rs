use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::errors::{Error, Result};
use super::extras::{Extras, CONTENT_TYPE};
use super::key::KeyPrefix;
use super::Provider;

#[derive(Clone, Debug)]
struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
}

/// A [`Provider`] that keeps blobs in a map, mostly useful in tests.
///
/// Recognizes the `content-type` [`Extras`] key and reports it back through
/// [`MemoryProvider::content_type`].
#[derive(Debug, Default)]
pub struct MemoryProvider {
    prefix: KeyPrefix,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryProvider {
    pub fn new(prefix: impl Into<KeyPrefix>) -> Self {
        Self {
            prefix: prefix.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// The content type recorded by the last [`Provider::put`] for `key`.
    pub async fn content_type(&self, key: &str) -> Result<Option<String>> {
        let key = self.prefix.apply(key);
        let objects = self.objects.read().await;
        let object = objects
            .get(&key)
            .ok_or_else(|| Error::object_not_found(&key))?;
        Ok(object.content_type.clone())
    }

    /// Effective keys of everything currently stored, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Provider for MemoryProvider {
    async fn exists(&self, key: &str) -> Result<bool> {
        let key = self.prefix.apply(key);
        Ok(self.objects.read().await.contains_key(&key))
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let key = self.prefix.apply(key);
        self.objects
            .read()
            .await
            .get(&key)
            .map(|object| object.body.clone())
            .ok_or_else(|| Error::object_not_found(&key))
    }

    async fn put(&self, key: &str, body: Bytes, extras: Option<&Extras>) -> Result<()> {
        let key = self.prefix.apply(key);
        let content_type = match extras {
            Some(extras) => extras.get_str(CONTENT_TYPE)?.map(String::from),
            None => None,
        };
        self.objects
            .write()
            .await
            .insert(key, StoredObject { body, content_type });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = self.prefix.apply(key);
        self.objects.write().await.remove(&key);
        Ok(())
    }
}
