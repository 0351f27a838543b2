//! Registry error types.

use thiserror::Error;

/// Errors surfaced by registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The slot pool for this managed type has no free slots.
    ///
    /// Every configured slot is occupied by a live entry. Superseded
    /// entries still referenced by outstanding handles count as live
    /// until the last handle drops.
    #[error("registry capacity exceeded: all {capacity} slots are live")]
    CapacityExceeded {
        /// Configured maximum number of live entries.
        capacity: usize,
    },
}
