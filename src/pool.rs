//! Fixed-capacity slot pool over the arena.
//!
//! Free-slot bookkeeping is a lock-free queue, so threads acquire and
//! release slots concurrently without touching a lock. Exhaustion is an
//! explicit error returned to the caller, never an assert.

use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_queue::ArrayQueue;
use log::warn;

use crate::arena::Arena;
use crate::error::RegistryError;
use crate::sync::RwLock;

/// One pool slot: the managed instance behind its own lock.
///
/// The lock is what makes aliased mutation through handles sound; every
/// handle to the same entry goes through it.
pub(crate) type Slot<T> = RwLock<T>;

/// Reuse-capable allocator handing out fixed slots from the arena.
///
/// A slot index handed out by [`acquire`](SlotPool::acquire) is
/// exclusively owned by one entry until [`release`](SlotPool::release)
/// returns it to the free set, where any later acquisition may pick it
/// up again.
pub(crate) struct SlotPool<T> {
    arena: Arena<Slot<T>>,

    /// Free slot indices; seeded with every index at construction.
    free: ArrayQueue<u32>,

    /// Currently live entries
    live: AtomicUsize,

    /// Total slots handed out
    acquired_total: AtomicU64,

    /// Total slots returned
    released_total: AtomicU64,
}

impl<T> SlotPool<T> {
    /// Create a pool with `max_elements` slots.
    pub fn new(max_elements: usize) -> Self {
        // ArrayQueue rejects zero capacity; a one-deep queue that is
        // never seeded keeps a zero-slot pool failing cleanly.
        let free = ArrayQueue::new(max_elements.max(1));
        for index in 0..max_elements as u32 {
            let _ = free.push(index);
        }

        Self {
            arena: Arena::new(max_elements),
            free,
            live: AtomicUsize::new(0),
            acquired_total: AtomicU64::new(0),
            released_total: AtomicU64::new(0),
        }
    }

    /// Acquire a free slot index.
    ///
    /// The slot's contents are uninitialized; the caller must construct
    /// into it before reading and must eventually pass the index back to
    /// [`release`](SlotPool::release).
    pub fn acquire(&self) -> Result<u32, RegistryError> {
        match self.free.pop() {
            Some(index) => {
                self.live.fetch_add(1, Ordering::Relaxed);
                self.acquired_total.fetch_add(1, Ordering::Relaxed);
                Ok(index)
            }
            None => {
                warn!("slot pool exhausted ({} slots live)", self.capacity());
                Err(RegistryError::CapacityExceeded {
                    capacity: self.capacity(),
                })
            }
        }
    }

    /// Return a slot to the free set.
    ///
    /// The slot's contents must already have been dropped (or never
    /// initialized).
    pub fn release(&self, index: u32) {
        #[cfg(feature = "debug")]
        // SAFETY: the slot is ours until it re-enters the free queue.
        unsafe {
            std::ptr::write_bytes(
                self.slot_ptr(index).as_ptr().cast::<u8>(),
                0xDD,
                std::mem::size_of::<Slot<T>>(),
            );
        }

        self.live.fetch_sub(1, Ordering::Relaxed);
        self.released_total.fetch_add(1, Ordering::Relaxed);

        // Queue capacity equals the slot count, so this cannot fail.
        let _ = self.free.push(index);
    }

    /// Address of the slot at `index`.
    pub fn slot_ptr(&self, index: u32) -> NonNull<Slot<T>> {
        self.arena.slot(index)
    }

    /// Configured slot count.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Currently live entries.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }

    /// Slots currently available for acquisition.
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Total slots handed out over the pool's lifetime.
    pub fn acquired_total(&self) -> u64 {
        self.acquired_total.load(Ordering::Relaxed)
    }

    /// Total slots returned over the pool's lifetime.
    pub fn released_total(&self) -> u64 {
        self.released_total.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release_reuses_index() {
        let pool: SlotPool<u64> = SlotPool::new(4);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.live(), 2);

        pool.release(a);
        assert_eq!(pool.live(), 1);

        // The freed index comes back around.
        let mut seen = Vec::new();
        while let Ok(index) = pool.acquire() {
            seen.push(index);
        }
        assert!(seen.contains(&a));
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let pool: SlotPool<u64> = SlotPool::new(2);

        let _a = pool.acquire().unwrap();
        let _b = pool.acquire().unwrap();

        assert_eq!(
            pool.acquire(),
            Err(RegistryError::CapacityExceeded { capacity: 2 })
        );
    }

    #[test]
    fn test_zero_capacity_pool() {
        let pool: SlotPool<u64> = SlotPool::new(0);

        assert_eq!(
            pool.acquire(),
            Err(RegistryError::CapacityExceeded { capacity: 0 })
        );
    }

    #[test]
    fn test_counters() {
        let pool: SlotPool<u64> = SlotPool::new(4);

        let a = pool.acquire().unwrap();
        let b = pool.acquire().unwrap();
        pool.release(a);
        pool.release(b);

        assert_eq!(pool.acquired_total(), 2);
        assert_eq!(pool.released_total(), 2);
        assert_eq!(pool.live(), 0);
        assert_eq!(pool.free_slots(), 4);
    }
}
