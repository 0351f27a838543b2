//! Fixed-capacity backing storage for one slot pool.
//!
//! One contiguous allocation made at construction, carved into equally
//! sized slots, freed only when the arena is dropped. It never grows:
//! exceeding the slot count is the pool's capacity error, not a resize.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

/// A contiguous region holding `capacity` slots of type `S`.
///
/// The arena only translates slot indices into addresses; it does not
/// track which slots are occupied. Slots are uninitialized until an
/// owner constructs into them, so the arena never reads or drops slot
/// contents itself.
pub(crate) struct Arena<S> {
    base: NonNull<S>,
    capacity: usize,
}

impl<S> Arena<S> {
    /// Allocate a region for `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        let layout = Layout::array::<S>(capacity).expect("arena layout overflow");

        let base = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            // SAFETY: layout has non-zero size.
            let ptr = unsafe { alloc(layout) };
            match NonNull::new(ptr.cast::<S>()) {
                Some(base) => base,
                None => handle_alloc_error(layout),
            }
        };

        Self { base, capacity }
    }

    /// Address of the slot at `index`.
    pub fn slot(&self, index: u32) -> NonNull<S> {
        debug_assert!((index as usize) < self.capacity);
        // SAFETY: index is within the region allocated in `new`.
        unsafe { NonNull::new_unchecked(self.base.as_ptr().add(index as usize)) }
    }

    /// Number of slots this arena was sized for.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<S> Drop for Arena<S> {
    fn drop(&mut self) {
        let layout = Layout::array::<S>(self.capacity).expect("arena layout overflow");
        if layout.size() != 0 {
            // SAFETY: allocated in `new` with the same layout; all slot
            // contents were dropped by their owners before the arena goes.
            unsafe { dealloc(self.base.as_ptr().cast(), layout) };
        }
    }
}

// SAFETY: the arena only hands out raw slot addresses; ownership and
// synchronization of slot contents live with the pool and its entries.
unsafe impl<S: Send> Send for Arena<S> {}
unsafe impl<S: Sync> Sync for Arena<S> {}
