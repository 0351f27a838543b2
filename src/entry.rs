//! Owning binding between a pool slot and one constructed instance.

use std::ptr::NonNull;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::pool::{Slot, SlotPool};
use crate::sync::RwLock;

/// Owns one constructed instance of `T` living in one pool slot.
///
/// Dropping the entry destroys the instance first, then returns the slot
/// to the pool. Entries are deliberately not `Clone`: a slot has exactly
/// one owner. The entry keeps its pool alive so the slot memory outlives
/// a registry that is dropped while handles are still outstanding.
pub(crate) struct Entry<T> {
    slot: NonNull<Slot<T>>,
    index: u32,
    pool: Arc<SlotPool<T>>,
}

/// Returns an acquired-but-unconstructed slot if construction unwinds.
struct Unclaimed<'a, T> {
    pool: &'a SlotPool<T>,
    index: u32,
    armed: bool,
}

impl<T> Drop for Unclaimed<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            self.pool.release(self.index);
        }
    }
}

impl<T> Entry<T> {
    /// Construct `value` in place in a freshly acquired slot.
    pub fn new(pool: &Arc<SlotPool<T>>, value: T) -> Result<Self, RegistryError> {
        Self::new_with(pool, move || value)
    }

    /// Acquire a slot, then construct the instance `init` produces in it.
    ///
    /// `init` only runs once a slot has been obtained.
    pub fn new_with(
        pool: &Arc<SlotPool<T>>,
        init: impl FnOnce() -> T,
    ) -> Result<Self, RegistryError> {
        let index = pool.acquire()?;
        let mut unclaimed = Unclaimed {
            pool: pool.as_ref(),
            index,
            armed: true,
        };

        let value = init();
        unclaimed.armed = false;

        let slot = pool.slot_ptr(index);
        // SAFETY: the index was just acquired, so the slot is unoccupied
        // and exclusively ours until release.
        unsafe { slot.as_ptr().write(RwLock::new(value)) };

        Ok(Self {
            slot,
            index,
            pool: Arc::clone(pool),
        })
    }

    /// The slot contents, behind the per-slot lock.
    pub fn slot(&self) -> &Slot<T> {
        // SAFETY: initialized in `new_with`, destroyed only in drop.
        unsafe { self.slot.as_ref() }
    }
}

impl<T> std::fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl<T> Drop for Entry<T> {
    fn drop(&mut self) {
        // Destroy the instance first, then hand the slot back.
        // SAFETY: constructed in `new_with`, dropped exactly once here.
        unsafe { std::ptr::drop_in_place(self.slot.as_ptr()) };
        self.pool.release(self.index);
    }
}

// SAFETY: the entry exclusively owns its slot; shared access to the
// instance goes through the slot lock.
unsafe impl<T: Send> Send for Entry<T> {}
unsafe impl<T: Send + Sync> Sync for Entry<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DropCounter<'a>(&'a AtomicUsize);

    impl Drop for DropCounter<'_> {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_entry_owns_value() {
        let pool = Arc::new(SlotPool::new(4));
        let entry = Entry::new(&pool, 42u64).unwrap();

        assert_eq!(*entry.slot().read(), 42);
        assert_eq!(pool.live(), 1);
    }

    #[test]
    fn test_drop_destroys_instance_and_frees_slot() {
        let drops = AtomicUsize::new(0);
        let pool = Arc::new(SlotPool::new(2));

        let entry = Entry::new(&pool, DropCounter(&drops)).unwrap();
        assert_eq!(pool.live(), 1);

        drop(entry);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.free_slots(), 2);
    }

    #[test]
    fn test_entry_keeps_pool_alive() {
        let pool = Arc::new(SlotPool::new(2));
        let entry = Entry::new(&pool, 7u32).unwrap();

        drop(pool);

        // The slot memory is still backed by the pool the entry holds.
        assert_eq!(*entry.slot().read(), 7);
    }

    #[test]
    fn test_capacity_error_propagates() {
        let pool: Arc<SlotPool<u64>> = Arc::new(SlotPool::new(1));

        let _held = Entry::new(&pool, 1).unwrap();
        let err = Entry::new(&pool, 2).unwrap_err();

        assert_eq!(err, RegistryError::CapacityExceeded { capacity: 1 });
    }
}
