//! Immutable persistent hash map.
//!
//! [`ImmutableHashMap`] is a hash array mapped trie (HAMT) whose mutations
//! return a new map in sublinear time while sharing every untouched node
//! with the original through [`Arc`](std::sync::Arc).
//!
//! # Layout
//!
//! - **Leaf**: one entry plus its 32-bit key hash
//! - **Collision chain**: entries whose keys differ but whose hashes are equal
//! - **Trie node**: up to 32 children behind a 32-bit occupancy bitmap
//!
//! Unlike a classic HAMT, a trie node does not consume a fixed 5-bit slice
//! per level. Each node carries its own *rotation*: when two hashes land in
//! the same slot, the new node searches rotations until their 5-bit slots
//! differ, so separation adapts to where the hashes actually diverge.
//!
//! # Key strategies
//!
//! Keys are hashed and compared through a [`KeyEquality`] strategy, values
//! through a [`ValueEquality`] strategy. The key strategy must satisfy
//! `equals(a, b) ⇒ hash(a) == hash(b)`; this is not checked.
//!
//! # Concurrency
//!
//! Nodes are never mutated after construction. Any number of threads may read
//! the same snapshot without coordination; publishing a new snapshot is the
//! caller's business.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod equality;
pub mod error;
pub mod iter;
pub mod node;

mod map;
mod ops;
mod registry;

#[cfg(test)]
mod tests;

pub use equality::{
    Comparers, DefaultKeyEquality, DefaultValueEquality, FnKeyEquality, FnValueEquality,
    KeyEquality, ValueEquality,
};
pub use error::{MapError, Result};
pub use map::ImmutableHashMap;
