//! Lookup operation: descends the trie to find a key.

use crate::equality::KeyEquality;
use crate::node::{self, Bucket, Leaf};

/// Searches for `key` in the subtree rooted at `bucket`.
///
/// Returns the matching leaf if found.
pub fn get_recursive<'a, K, V>(
    bucket: &'a Bucket<K, V>,
    hash: u32,
    key: &K,
    key_eq: &dyn KeyEquality<K>,
) -> Option<&'a Leaf<K, V>> {
    match bucket {
        Bucket::Leaf(leaf) => {
            if leaf.hash == hash && key_eq.equals(&leaf.key, key) {
                Some(&**leaf)
            } else {
                None
            }
        }
        Bucket::Chain(chain) => {
            if chain.hash() != hash {
                return None;
            }
            // Linear search through colliding entries.
            chain
                .entries()
                .iter()
                .find(|leaf| key_eq.equals(key, &leaf.key))
                .map(|leaf| &**leaf)
        }
        Bucket::Trie(trie) => {
            let slot = trie.slot_of(hash);
            if !trie.is_occupied(slot) {
                return None;
            }
            let child = &trie.children()[node::physical_index(trie.occupancy(), slot)];
            get_recursive(child, hash, key, key_eq)
        }
    }
}
