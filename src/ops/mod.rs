//! Recursive trie operations.

pub mod add;
pub mod get;
pub mod remove;
