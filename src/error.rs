//! Errors reported by map operations.

use thiserror::Error;

/// Failure of a map operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MapError {
    /// `add` found the key already mapped to a different value.
    #[error("an entry with the same key but a different value already exists")]
    DuplicateKey,
    /// Indexed lookup of a key that is not present.
    #[error("the given key was not present in the map")]
    KeyNotFound,
}

/// Result alias used across the crate.
pub type Result<T, E = MapError> = std::result::Result<T, E>;
