//! Storage for bean definitions
//!
//! Uses DashMap for lock-free concurrent lookups by name. Registration
//! order is tracked separately so refresh and harvest walk beans in a
//! stable order.

use crate::definition::BeanEntry;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe storage for bean entries
pub(crate) struct BeanStorage {
    /// Map from bean name to entry
    entries: DashMap<String, Arc<BeanEntry>, RandomState>,
    /// Bean names in registration order
    order: RwLock<Vec<String>>,
}

impl BeanStorage {
    /// Create new empty storage.
    ///
    /// 8 shards: bean counts are small and registration is not a hot path.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher_and_shard_amount(0, RandomState::new(), 8),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Insert an entry unless the name is taken.
    ///
    /// Returns `false` when an entry with the same name already exists.
    pub fn insert(&self, entry: BeanEntry) -> bool {
        use dashmap::mapref::entry::Entry;

        match self.entries.entry(entry.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                let mut order = self.order.write().unwrap_or_else(|e| e.into_inner());
                order.push(entry.name.clone());
                slot.insert(Arc::new(entry));
                true
            }
        }
    }

    /// Look up an entry. The returned `Arc` does not hold a map guard, so
    /// factories may re-enter the storage while building the bean.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Arc<BeanEntry>> {
        self.entries.get(name).map(|entry| Arc::clone(entry.value()))
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All entries in registration order.
    ///
    /// `insert` holds a shard lock while it takes the order lock, so the
    /// order lock is released before any shard is read.
    pub fn entries(&self) -> Vec<Arc<BeanEntry>> {
        self.names().iter().filter_map(|name| self.get(name)).collect()
    }

    /// Bean names in registration order
    pub fn names(&self) -> Vec<String> {
        self.order.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BeanStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BeanStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeanStorage").field("count", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BeanDefinition;

    #[derive(Clone)]
    struct TestService {
        value: i32,
    }

    fn entry(name: &str, value: i32) -> BeanEntry {
        BeanDefinition::singleton(name, TestService { value }).into_entry()
    }

    #[test]
    fn test_storage_insert_and_get() {
        let storage = BeanStorage::new();
        assert!(storage.insert(entry("service", 42)));

        let found = storage.get("service").unwrap();
        assert_eq!(found.name, "service");
        assert!(storage.contains("service"));
        assert!(!storage.contains("other"));
    }

    #[test]
    fn test_storage_rejects_duplicate_names() {
        let storage = BeanStorage::new();
        assert!(storage.insert(entry("service", 1)));
        assert!(!storage.insert(entry("service", 2)));
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.names(), vec!["service".to_string()]);
    }

    #[test]
    fn test_storage_keeps_registration_order() {
        let storage = BeanStorage::new();
        for (i, name) in ["c", "a", "b"].iter().enumerate() {
            storage.insert(entry(name, i as i32));
        }

        let names: Vec<_> = storage.entries().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        let bean = storage.get("a").unwrap().factory.resolve(&crate::ApplicationContext::new());
        let bean = bean.unwrap().downcast::<TestService>().unwrap();
        assert_eq!(bean.value, 1);
    }

    #[test]
    fn test_concurrent_insert_and_entries() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::thread;

        let storage = Arc::new(BeanStorage::new());
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Acquire) {
                        let entries = storage.entries();
                        assert!(entries.len() <= 4 * 500);
                    }
                })
            })
            .collect();

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for i in 0..500 {
                        assert!(storage.insert(entry(&format!("bean-{t}-{i}"), i)));
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }
        done.store(true, Ordering::Release);
        for reader in readers {
            reader.join().unwrap();
        }

        assert_eq!(storage.len(), 4 * 500);
        assert_eq!(storage.entries().len(), 4 * 500);
    }
}
