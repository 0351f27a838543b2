//! # assetpool
//!
//! Arena-pooled, concurrent, string-keyed registries for typed assets.
//!
//! A [`Registry<T>`] stores a bounded number of named `T` instances in a
//! fixed-capacity arena instead of per-object heap allocations, and hands
//! out [`Handle`]s for lock-minimal concurrent reads and in-place writes.
//! It suits workloads that repeatedly create, replace, and look up assets
//! of a known type from many threads.
//!
//! ## Features
//!
//! - Fixed-capacity slot pool per registry (one arena allocation, reused
//!   slots, no heap churn)
//! - Lock-free free-slot bookkeeping for concurrent create/drop
//! - Insert-or-replace semantics keyed by identifier
//! - Snapshot handles: an overwrite never invalidates handles already
//!   held to the old value
//! - Explicit capacity errors instead of aborts
//! - Unnamed assets via a monotonically increasing per-registry counter
//!
//! ## Quick Start
//!
//! ```rust
//! use assetpool::{PoolConfig, Registry};
//!
//! let registry: Registry<String> = Registry::new(PoolConfig::default());
//!
//! let handle = registry.create("greeting", String::from("hello"))?;
//! assert_eq!(*handle.read(), "hello");
//!
//! handle.update(|s| s.push_str(", world"));
//! assert_eq!(*registry.find("greeting").unwrap().read(), "hello, world");
//! # Ok::<(), assetpool::RegistryError>(())
//! ```
//!
//! ## Handle semantics
//!
//! A handle is bound to the entry as it existed at lookup/creation time.
//! Replacing the identifier installs a new entry for future lookups, but
//! outstanding handles keep reading (and keep alive) the snapshot they
//! were bound to:
//!
//! ```rust
//! use assetpool::{PoolConfig, Registry};
//!
//! let registry: Registry<u32> = Registry::new(PoolConfig::default());
//!
//! let old = registry.create("tex", 1)?;
//! registry.create("tex", 2)?;
//!
//! assert_eq!(*old.read(), 1);
//! assert_eq!(*registry.find("tex").unwrap().read(), 2);
//! # Ok::<(), assetpool::RegistryError>(())
//! ```

mod arena;
mod config;
mod entry;
mod error;
mod handle;
mod pool;
mod registry;
mod sync;

pub use config::PoolConfig;
pub use error::RegistryError;
pub use handle::{Handle, ReadGuard, WriteGuard};
pub use registry::{Registry, RegistryStats};
