//! Concurrent string-keyed registry over a fixed slot pool.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use log::debug;

use crate::config::PoolConfig;
use crate::entry::Entry;
use crate::error::RegistryError;
use crate::handle::Handle;
use crate::pool::SlotPool;

/// A registry of named `T` instances backed by a fixed-capacity pool.
///
/// One registry manages exactly one type. Construct one per asset type
/// at the application's composition root and share it from there
/// (wrap in an `Arc` to share across threads); there is no hidden
/// global instance.
///
/// All operations are safe to call concurrently. Two racing `create`
/// calls on the same identifier both construct their value; the last
/// writer's entry is the one lookups observe, and the loser's is
/// reclaimed once nothing references it.
pub struct Registry<T> {
    table: DashMap<String, Arc<Entry<T>>>,
    pool: Arc<SlotPool<T>>,

    /// Feeds `create_unnamed`; monotonically increasing, never reused.
    unnamed_counter: AtomicU64,

    created_total: AtomicU64,
    replaced_total: AtomicU64,
    removed_total: AtomicU64,
}

impl<T> Registry<T> {
    /// Create a registry whose pool is sized from `config`.
    ///
    /// The arena for `config.max_elements` slots is allocated here and
    /// never grows.
    pub fn new(config: PoolConfig) -> Self {
        Self {
            table: DashMap::with_capacity(config.max_elements),
            pool: Arc::new(SlotPool::new(config.max_elements)),
            unnamed_counter: AtomicU64::new(0),
            created_total: AtomicU64::new(0),
            replaced_total: AtomicU64::new(0),
            removed_total: AtomicU64::new(0),
        }
    }

    /// Construct `value` in a pool slot and install it under `id`.
    ///
    /// Replaces any existing entry under `id`; handles already bound to
    /// the old entry keep reading the old value, and its slot frees up
    /// once the last of them drops. Because the old entry stays live
    /// across the swap, an overwrite needs one free slot just like a
    /// fresh insert.
    ///
    /// # Errors
    ///
    /// [`RegistryError::CapacityExceeded`] when every slot is occupied
    /// by a live entry.
    pub fn create(&self, id: impl Into<String>, value: T) -> Result<Handle<T>, RegistryError> {
        let entry = Entry::new(&self.pool, value)?;
        Ok(self.install(id.into(), entry))
    }

    /// Like [`create`](Registry::create), but the value is produced by
    /// `init`, which only runs once a slot has been acquired.
    pub fn create_with(
        &self,
        id: impl Into<String>,
        init: impl FnOnce() -> T,
    ) -> Result<Handle<T>, RegistryError> {
        let entry = Entry::new_with(&self.pool, init)?;
        Ok(self.install(id.into(), entry))
    }

    /// Install `value` under a freshly generated identifier.
    ///
    /// Identifiers are the decimal rendering of a per-registry counter,
    /// monotonically increasing and never reused; concurrent callers
    /// always receive distinct identifiers. The returned handle's
    /// [`id`](Handle::id) reports the generated name.
    pub fn create_unnamed(&self, value: T) -> Result<Handle<T>, RegistryError> {
        let id = self.unnamed_counter.fetch_add(1, Ordering::Relaxed).to_string();
        self.create(id, value)
    }

    /// Handle to the current entry under `id`, if any.
    ///
    /// The handle is bound to the entry as it exists now; a later
    /// overwrite of `id` does not redirect it.
    pub fn find(&self, id: &str) -> Option<Handle<T>> {
        let entry = self.table.get(id).map(|occupied| Arc::clone(occupied.value()))?;
        Some(Handle {
            id: Arc::from(id),
            entry,
        })
    }

    /// Remove the binding for `id`. Returns whether it existed.
    ///
    /// The entry is destroyed once no handle references it.
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.table.remove(id).is_some();
        if removed {
            self.removed_total.fetch_add(1, Ordering::Relaxed);
            debug!("removed entry {id:?}");
        }
        removed
    }

    /// Remove every binding.
    ///
    /// Subsequent lookups miss and [`size`](Registry::size) reports
    /// zero immediately; each entry is destroyed once its outstanding
    /// handles drop.
    pub fn clear(&self) {
        self.table.clear();
        debug!("cleared registry");
    }

    /// Current count of live identifiers.
    ///
    /// A snapshot: concurrent mutators may change it before the caller
    /// acts on it.
    pub fn size(&self) -> usize {
        self.table.len()
    }

    /// Whether no identifiers are currently bound.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Configured maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// Point-in-time counters for this registry.
    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            named_entries: self.table.len(),
            live_entries: self.pool.live(),
            free_slots: self.pool.free_slots(),
            capacity: self.pool.capacity(),
            created_total: self.created_total.load(Ordering::Relaxed),
            replaced_total: self.replaced_total.load(Ordering::Relaxed),
            removed_total: self.removed_total.load(Ordering::Relaxed),
        }
    }

    fn install(&self, id: String, entry: Entry<T>) -> Handle<T> {
        let entry = Arc::new(entry);
        let handle = Handle {
            id: Arc::from(id.as_str()),
            entry: Arc::clone(&entry),
        };

        // The previous entry (if any) drops here unless handles to it
        // are still outstanding.
        let previous = self.table.insert(id, entry);
        if previous.is_some() {
            self.replaced_total.fetch_add(1, Ordering::Relaxed);
            debug!("replaced entry {:?}", handle.id());
        } else {
            self.created_total.fetch_add(1, Ordering::Relaxed);
            debug!("created entry {:?}", handle.id());
        }

        handle
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

/// Point-in-time counters for one registry.
#[derive(Debug, Clone, Default)]
pub struct RegistryStats {
    /// Identifiers currently resolvable via `find`
    pub named_entries: usize,
    /// Live entries, including superseded ones kept alive by handles
    pub live_entries: usize,
    /// Slots available for new entries
    pub free_slots: usize,
    /// Configured maximum live entries
    pub capacity: usize,
    /// Entries installed under previously unbound identifiers
    pub created_total: u64,
    /// Entries that replaced an existing identifier
    pub replaced_total: u64,
    /// Explicit removals
    pub removed_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Registry<i32> {
        Registry::new(PoolConfig::minimal())
    }

    #[test]
    fn test_create_find_roundtrip() {
        let registry = small();

        registry.create("answer", 42).unwrap();

        let handle = registry.find("answer").unwrap();
        assert_eq!(handle.id(), "answer");
        assert_eq!(*handle.read(), 42);
    }

    #[test]
    fn test_find_miss() {
        let registry = small();
        assert!(registry.find("nothing").is_none());
    }

    #[test]
    fn test_overwrite_keeps_size() {
        let registry = small();

        registry.create("k", 1).unwrap();
        registry.create("k", 2).unwrap();
        assert_eq!(registry.size(), 1);
        assert_eq!(*registry.find("k").unwrap().read(), 2);

        registry.create("other", 3).unwrap();
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn test_keys_are_independent() {
        let registry = small();

        registry.create("a", 1).unwrap();
        registry.create("b", 2).unwrap();
        registry.create("a", 10).unwrap();

        assert_eq!(*registry.find("b").unwrap().read(), 2);
    }

    #[test]
    fn test_create_with_runs_after_slot_acquisition() {
        let registry: Registry<i32> = Registry::new(PoolConfig::default().with_max_elements(1));

        registry.create("only", 1).unwrap();

        let mut ran = false;
        let err = registry
            .create_with("blocked", || {
                ran = true;
                2
            })
            .unwrap_err();

        assert_eq!(err, RegistryError::CapacityExceeded { capacity: 1 });
        assert!(!ran);
    }

    #[test]
    fn test_unnamed_ids_are_sequential_decimal() {
        let registry = small();

        let first = registry.create_unnamed(1).unwrap();
        let second = registry.create_unnamed(2).unwrap();

        assert_eq!(first.id(), "0");
        assert_eq!(second.id(), "1");
        assert_eq!(registry.size(), 2);
    }

    #[test]
    fn test_remove() {
        let registry = small();

        registry.create("gone", 5).unwrap();
        assert!(registry.remove("gone"));
        assert!(!registry.remove("gone"));
        assert!(registry.find("gone").is_none());
    }

    #[test]
    fn test_clear() {
        let registry = small();

        registry.create("a", 1).unwrap();
        registry.create_unnamed(2).unwrap();

        registry.clear();
        assert_eq!(registry.size(), 0);
        assert!(registry.is_empty());
        assert!(registry.find("a").is_none());
    }

    #[test]
    fn test_stats() {
        let registry = small();

        registry.create("a", 1).unwrap();
        registry.create("a", 2).unwrap();
        registry.create("b", 3).unwrap();
        registry.remove("b");

        let stats = registry.stats();
        assert_eq!(stats.named_entries, 1);
        assert_eq!(stats.live_entries, 1);
        assert_eq!(stats.capacity, 16);
        assert_eq!(stats.free_slots, 15);
        assert_eq!(stats.created_total, 2);
        assert_eq!(stats.replaced_total, 1);
        assert_eq!(stats.removed_total, 1);
    }

    #[test]
    fn test_slot_returns_after_overwrite() {
        let registry = small();

        registry.create("churn", 0).unwrap();
        for i in 1..100 {
            registry.create("churn", i).unwrap();
        }

        // No handles held, so each overwrite freed its predecessor.
        assert_eq!(registry.stats().live_entries, 1);
    }
}
