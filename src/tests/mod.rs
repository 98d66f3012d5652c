mod basic;
mod stress;
mod traits;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::node::{self, Bucket};
use crate::{DefaultValueEquality, FnKeyEquality, ImmutableHashMap};

/// A key type with a controllable hash value for testing hash collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollidingKey {
    pub id: u32,
    pub forced_hash: u64,
}

impl CollidingKey {
    pub const fn new(id: u32, hash: u64) -> Self {
        Self {
            id,
            forced_hash: hash,
        }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.forced_hash.hash(state);
    }
}

/// Map over `u32` keys whose hash is the key itself, so trie layout is
/// predictable.
pub fn identity_map<V: PartialEq + 'static>() -> ImmutableHashMap<u32, V> {
    ImmutableHashMap::with_equality(
        Arc::new(FnKeyEquality::new(|k: &u32| *k, |a: &u32, b: &u32| a == b)),
        Arc::new(DefaultValueEquality),
    )
}

/// Walks the whole trie and asserts every structural invariant.
pub fn check_invariants<K, V>(map: &ImmutableHashMap<K, V>) {
    let mut path = Vec::new();
    let counted = map.root().map_or(0, |root| check_bucket(root, &mut path));
    assert_eq!(counted, map.len(), "node counts disagree with entries");
    assert_eq!(map.iter().count(), map.len(), "traversal disagrees with len");
    assert_eq!(map.is_empty(), map.len() == 0);
}

/// `path` holds `(rotation, slot)` for every trie node above `bucket`.
fn check_bucket<K, V>(bucket: &Bucket<K, V>, path: &mut Vec<(u32, u32)>) -> usize {
    match bucket {
        Bucket::Leaf(leaf) => {
            check_path(leaf.hash, path);
            1
        }
        Bucket::Chain(chain) => {
            assert!(chain.len() >= 2, "collision chain with {} entries", chain.len());
            assert!(chain.entries().iter().all(|e| e.hash == chain.hash()));
            check_path(chain.hash(), path);
            chain.len()
        }
        Bucket::Trie(trie) => {
            let children = trie.children();
            assert!(children.len() >= 2, "trie node with {} children", children.len());
            assert_eq!(children.len(), node::popcount(trie.occupancy()) as usize);
            assert!(trie.rotation() < node::SLOT_COUNT);

            let mut total = 0;
            let mut physical = 0;
            for slot in 0..node::SLOT_COUNT {
                if !trie.is_occupied(slot) {
                    continue;
                }
                assert_eq!(node::physical_index(trie.occupancy(), slot), physical);
                path.push((trie.rotation(), slot));
                total += check_bucket(&children[physical], path);
                path.pop();
                physical += 1;
            }
            assert_eq!(total, trie.count(), "stale trie node count");
            total
        }
    }
}

fn check_path(hash: u32, path: &[(u32, u32)]) {
    for &(rotation, slot) in path {
        assert_eq!(
            node::logical_slot(hash, rotation),
            slot,
            "hash {hash:#010x} stored under the wrong slot"
        );
    }
}
