use crate::core::cache::KeyValueCollection;
use async_trait::async_trait;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::sync::Arc;
use tracing::debug;

/// Collection backed by a fjall partition.
///
/// Storage errors are logged and treated as misses so a broken cache never
/// blocks a price lookup.
pub struct DiskCollection {
    keyspace: Arc<Keyspace>,
    partition: PartitionHandle,
}

impl DiskCollection {
    pub fn new(keyspace: Arc<Keyspace>, partition: PartitionHandle) -> Self {
        Self {
            keyspace,
            partition,
        }
    }
}

#[async_trait]
impl KeyValueCollection for DiskCollection {
    async fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.partition.get(key) {
            Ok(Some(value)) => {
                debug!("Cache HIT for key: {}", String::from_utf8_lossy(key));
                Some(value.to_vec())
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", String::from_utf8_lossy(key));
                None
            }
            Err(e) => {
                debug!("DiskCollection get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &[u8], value: &[u8]) {
        let res = self
            .partition
            .insert(key, value)
            .and_then(|_| self.keyspace.persist(PersistMode::SyncAll));
        match res {
            Ok(()) => debug!("Cache PUT for key: {}", String::from_utf8_lossy(key)),
            Err(e) => debug!("DiskCollection put error: {}", e),
        }
    }

    async fn remove(&self, key: &[u8]) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskCollection remove error: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjall::PartitionCreateOptions;
    use tempfile::tempdir;

    fn open(path: &std::path::Path) -> DiskCollection {
        let keyspace = Arc::new(fjall::Config::new(path).open().unwrap());
        let partition = keyspace
            .open_partition("spot", PartitionCreateOptions::default())
            .unwrap();
        DiskCollection::new(keyspace, partition)
    }

    #[tokio::test]
    async fn test_disk_collection_get_put_remove() {
        let dir = tempdir().unwrap();
        let cache = open(dir.path());

        assert!(cache.get(b"key1").await.is_none());

        cache.put(b"key1", b"123").await;
        assert_eq!(cache.get(b"key1").await, Some(b"123".to_vec()));

        cache.remove(b"key1").await;
        assert!(cache.get(b"key1").await.is_none());
    }
}
