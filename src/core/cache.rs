use async_trait::async_trait;
use std::sync::Arc;

/// A named bucket of raw key-value pairs.
///
/// Expiry is not handled here. Callers that need a TTL store their own
/// timestamps alongside the value.
#[async_trait]
pub trait KeyValueCollection: Send + Sync {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>>;
    async fn put(&self, key: &[u8], value: &[u8]);
    async fn remove(&self, key: &[u8]);
}

pub trait Store: Send + Sync {
    /// Opens a collection. Persistent collections fall back to memory when
    /// the backing storage cannot be opened.
    fn get_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection>;
}
