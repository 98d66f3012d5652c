//! Removal operation: path-copy delete with node collapse.

use std::sync::Arc;

use tracing::trace;

use crate::equality::KeyEquality;
use crate::node::{self, Bucket, CollisionChain, TrieNode};

/// Removes `key` from the subtree rooted at `bucket`.
///
/// Returns `None` if the subtree is now empty, or `bucket` itself (same
/// `Arc`) if the key was not present.
pub fn remove_recursive<K, V>(
    bucket: &Bucket<K, V>,
    hash: u32,
    key: &K,
    key_eq: &dyn KeyEquality<K>,
) -> Option<Bucket<K, V>> {
    match bucket {
        Bucket::Leaf(leaf) => {
            if leaf.hash == hash && key_eq.equals(&leaf.key, key) {
                None
            } else {
                Some(bucket.clone())
            }
        }
        Bucket::Chain(chain) => Some(remove_from_chain(bucket, chain, hash, key, key_eq)),
        Bucket::Trie(trie) => remove_from_trie(bucket, trie, hash, key, key_eq),
    }
}

// ---------------------------------------------------------------------------
// Collision chain
// ---------------------------------------------------------------------------

fn remove_from_chain<K, V>(
    this: &Bucket<K, V>,
    chain: &CollisionChain<K, V>,
    hash: u32,
    key: &K,
    key_eq: &dyn KeyEquality<K>,
) -> Bucket<K, V> {
    if chain.hash() != hash {
        return this.clone();
    }

    let entries = chain.entries();
    let Some(pos) = entries.iter().position(|leaf| key_eq.equals(key, &leaf.key)) else {
        return this.clone();
    };

    if entries.len() == 2 {
        // A chain never holds a single entry; the survivor becomes a bare leaf.
        let survivor = &entries[1 - pos];
        return Bucket::Leaf(Arc::clone(survivor));
    }

    let mut remaining = entries.to_vec();
    remaining.remove(pos);
    Bucket::Chain(Arc::new(CollisionChain::new(remaining)))
}

// ---------------------------------------------------------------------------
// Trie node
// ---------------------------------------------------------------------------

fn remove_from_trie<K, V>(
    this: &Bucket<K, V>,
    trie: &TrieNode<K, V>,
    hash: u32,
    key: &K,
    key_eq: &dyn KeyEquality<K>,
) -> Option<Bucket<K, V>> {
    let slot = trie.slot_of(hash);
    if !trie.is_occupied(slot) {
        return Some(this.clone());
    }

    let pos = node::physical_index(trie.occupancy(), slot);
    let children = trie.children();
    let existing = &children[pos];

    match remove_recursive(existing, hash, key, key_eq) {
        None => match children.len() {
            1 => None,
            2 => {
                // Collapse: the other child replaces this node.
                trace!(rotation = trie.rotation(), "trie node collapsed");
                Some(children[1 - pos].clone())
            }
            _ => {
                let new_node = TrieNode::from_parts(
                    trie.rotation(),
                    trie.occupancy() & !node::mask(slot),
                    node::children_removing(children, pos),
                    trie.count() - existing.count(),
                );
                Some(Bucket::Trie(Arc::new(new_node)))
            }
        },
        Some(result) if result.ptr_eq(existing) => Some(this.clone()),
        Some(result) => {
            let count = trie.count() - existing.count() + result.count();
            let new_node = TrieNode::from_parts(
                trie.rotation(),
                trie.occupancy(),
                node::children_replacing(children, pos, result),
                count,
            );
            Some(Bucket::Trie(Arc::new(new_node)))
        }
    }
}
