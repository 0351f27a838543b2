//! Synchronization primitives.
//!
//! Provides thin wrappers over std or parking_lot locks.

pub(crate) mod rwlock;

pub(crate) use rwlock::{RwLock, RwLockReadGuard, RwLockWriteGuard};
