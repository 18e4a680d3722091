pub mod disk;
pub mod memory;

use crate::core::cache::{KeyValueCollection, Store};
use disk::DiskCollection;
use fjall::{Keyspace, PartitionCreateOptions};
use memory::MemoryCollection;
use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, RwLock},
};
use tracing::warn;

/// A thread-safe key-value store that can hold multiple collections.
pub struct KeyValueStore {
    collections: RwLock<HashMap<(String, bool), Arc<dyn KeyValueCollection>>>,
    keyspace: Option<Arc<Keyspace>>,
}

impl KeyValueStore {
    /// Opens a store whose persistent collections live under `data_path/cache`.
    pub fn open(data_path: &Path) -> Self {
        let cache_dir = data_path.join("cache");
        let keyspace = match fjall::Config::new(&cache_dir).open() {
            Ok(keyspace) => Some(Arc::new(keyspace)),
            Err(e) => {
                warn!(
                    "Could not open cache at {}: {}. Falling back to memory",
                    cache_dir.display(),
                    e
                );
                None
            }
        };

        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace,
        }
    }

    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            keyspace: None,
        }
    }

    fn open_disk_collection(&self, name: &str) -> Option<Arc<dyn KeyValueCollection>> {
        let keyspace = self.keyspace.as_ref()?;
        match keyspace.open_partition(name, PartitionCreateOptions::default()) {
            Ok(partition) => Some(
                Arc::new(DiskCollection::new(Arc::clone(keyspace), partition))
                    as Arc<dyn KeyValueCollection>,
            ),
            Err(e) => {
                warn!("Could not open cache partition {}: {}", name, e);
                None
            }
        }
    }
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Store for KeyValueStore {
    fn get_collection(&self, name: &str, persist: bool) -> Arc<dyn KeyValueCollection> {
        let key = (name.to_string(), persist);
        if let Some(existing) = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&key)
        {
            return Arc::clone(existing);
        }

        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let collection = collections.entry(key).or_insert_with(|| {
            let disk = if persist {
                self.open_disk_collection(name)
            } else {
                None
            };
            disk.unwrap_or_else(|| Arc::new(MemoryCollection::new()) as Arc<dyn KeyValueCollection>)
        });
        Arc::clone(collection)
    }
}
