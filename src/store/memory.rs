use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory collection, lost when the process exits.
#[derive(Default)]
pub struct MemoryCollection {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueCollection for MemoryCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let cache = self.inner.lock().await;
        let value = cache.get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
        } else {
            debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
        }
        value
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", String::from_utf8_lossy(key));
        cache.insert(key.to_vec(), value.to_vec());
    }

    async fn remove(&self, key: &[u8]) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache REMOVE for key: {}", String::from_utf8_lossy(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_collection_get_put() {
        let cache = MemoryCollection::new();

        // Initially, cache is empty
        assert!(cache.get(b"key1").await.is_none());

        cache.put(b"key1", b"123").await;
        assert_eq!(cache.get(b"key1").await, Some(b"123".to_vec()));

        // Put replaces the whole value
        cache.put(b"key1", b"4").await;
        assert_eq!(cache.get(b"key1").await, Some(b"4".to_vec()));

        assert!(cache.get(b"key2").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_collection_remove() {
        let cache = MemoryCollection::new();

        cache.put(b"key1", b"123").await;
        cache.remove(b"key1").await;
        assert!(cache.get(b"key1").await.is_none());
    }
}
