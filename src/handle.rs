//! Read/write capabilities over registry entries.

use std::fmt;
use std::sync::Arc;

use crate::entry::Entry;
use crate::sync::{RwLockReadGuard, RwLockWriteGuard};

/// A capability referencing one entry snapshot.
///
/// Handles are bound at `create`/`find` time and never rebind: if the
/// identifier is overwritten, removed, or the registry cleared, an
/// existing handle keeps reporting the value it was bound to, and that
/// snapshot stays allocated until the last handle referencing it drops.
/// A fresh [`find`](crate::Registry::find) after an overwrite observes
/// the new value.
///
/// Clones share the snapshot: mutation through one handle is visible to
/// every handle bound to the same entry. The per-entry lock covers one
/// guard's critical section; atomicity across several operations is the
/// caller's business.
pub struct Handle<T> {
    pub(crate) id: Arc<str>,
    pub(crate) entry: Arc<Entry<T>>,
}

impl<T> Handle<T> {
    /// Identifier this handle was bound under.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Acquire shared read access to the referenced instance.
    pub fn read(&self) -> ReadGuard<'_, T> {
        ReadGuard(self.entry.slot().read())
    }

    /// Acquire exclusive write access to the referenced instance.
    pub fn write(&self) -> WriteGuard<'_, T> {
        WriteGuard(self.entry.slot().write())
    }

    /// Run `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read())
    }

    /// Mutate the referenced instance in place.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.write())
    }

    /// Whether two handles reference the very same entry.
    pub fn same_entry(&self, other: &Handle<T>) -> bool {
        Arc::ptr_eq(&self.entry, &other.entry)
    }
}

impl<T: Clone> Handle<T> {
    /// Clone the current value out of the slot.
    pub fn snapshot(&self) -> T {
        self.read().clone()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            id: Arc::clone(&self.id),
            entry: Arc::clone(&self.entry),
        }
    }
}

// No value access here: Debug must not take the slot lock.
impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("id", &self.id).finish()
    }
}

/// Shared read guard over a handle's instance.
pub struct ReadGuard<'a, T>(RwLockReadGuard<'a, T>);

impl<'a, T> std::ops::Deref for ReadGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Exclusive write guard over a handle's instance.
pub struct WriteGuard<'a, T>(RwLockWriteGuard<'a, T>);

impl<'a, T> std::ops::Deref for WriteGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, T> std::ops::DerefMut for WriteGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
