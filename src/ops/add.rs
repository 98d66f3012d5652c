//! Insertion operation: path-copy add that shares every untouched subtree.

use std::convert::Infallible;
use std::sync::Arc;

use crate::equality::{KeyEquality, ValueEquality};
use crate::error::MapError;
use crate::node::{self, Bucket, CollisionChain, Leaf, TrieNode};

/// What to do when the key exists with a different value.
pub trait DuplicatePolicy {
    /// Failure reported on a conflicting value.
    type Error;

    /// Called on a conflict; `Ok(())` replaces the stored entry.
    ///
    /// # Errors
    ///
    /// Returns the policy's error when the conflict is not allowed.
    fn on_conflict() -> Result<(), Self::Error>;
}

/// Fail with [`MapError::DuplicateKey`].
pub struct Reject;

impl DuplicatePolicy for Reject {
    type Error = MapError;

    fn on_conflict() -> Result<(), MapError> {
        Err(MapError::DuplicateKey)
    }
}

/// Replace the stored entry. Never fails.
pub struct Overwrite;

impl DuplicatePolicy for Overwrite {
    type Error = Infallible;

    fn on_conflict() -> Result<(), Infallible> {
        Ok(())
    }
}

/// Strategies threaded through a recursive add.
pub struct AddContext<'a, K, V> {
    /// Key hashing and equality.
    pub key_eq: &'a dyn KeyEquality<K>,
    /// Value equality, used to detect no-op writes.
    pub value_eq: &'a dyn ValueEquality<V>,
}

/// Adds `incoming` to the subtree rooted at `bucket`.
///
/// Returns `bucket` itself (same `Arc`) when nothing changes. A trie node
/// created on the way down starts its rotation search at
/// `suggested_rotation`.
///
/// # Errors
///
/// Returns the policy's error if the key is present with a different value
/// and `P` does not allow replacing it.
pub fn add_recursive<K, V, P: DuplicatePolicy>(
    bucket: &Bucket<K, V>,
    suggested_rotation: u32,
    incoming: Arc<Leaf<K, V>>,
    ctx: &AddContext<'_, K, V>,
) -> Result<Bucket<K, V>, P::Error> {
    match bucket {
        Bucket::Leaf(leaf) => {
            add_to_leaf::<K, V, P>(bucket, leaf, suggested_rotation, incoming, ctx)
        }
        Bucket::Chain(chain) => {
            add_to_chain::<K, V, P>(bucket, chain, suggested_rotation, incoming, ctx)
        }
        Bucket::Trie(trie) => add_to_trie::<K, V, P>(bucket, trie, incoming, ctx),
    }
}

// ---------------------------------------------------------------------------
// Leaf
// ---------------------------------------------------------------------------

fn add_to_leaf<K, V, P: DuplicatePolicy>(
    this: &Bucket<K, V>,
    leaf: &Arc<Leaf<K, V>>,
    suggested_rotation: u32,
    incoming: Arc<Leaf<K, V>>,
    ctx: &AddContext<'_, K, V>,
) -> Result<Bucket<K, V>, P::Error> {
    if leaf.hash != incoming.hash {
        return Ok(split(suggested_rotation, this, leaf.hash, incoming));
    }

    if !ctx.key_eq.equals(&leaf.key, &incoming.key) {
        // Same hash, different key: no rotation can ever separate them.
        let chain = CollisionChain::new(vec![Arc::clone(leaf), incoming]);
        return Ok(Bucket::Chain(Arc::new(chain)));
    }

    if replaces_existing::<K, V, P>(&leaf.value, &incoming.value, ctx)? {
        Ok(Bucket::Leaf(incoming))
    } else {
        Ok(this.clone())
    }
}

// ---------------------------------------------------------------------------
// Collision chain
// ---------------------------------------------------------------------------

fn add_to_chain<K, V, P: DuplicatePolicy>(
    this: &Bucket<K, V>,
    chain: &CollisionChain<K, V>,
    suggested_rotation: u32,
    incoming: Arc<Leaf<K, V>>,
    ctx: &AddContext<'_, K, V>,
) -> Result<Bucket<K, V>, P::Error> {
    if chain.hash() != incoming.hash {
        return Ok(split(suggested_rotation, this, chain.hash(), incoming));
    }

    let entries = chain.entries();
    let found = entries
        .iter()
        .position(|leaf| ctx.key_eq.equals(&incoming.key, &leaf.key));

    let updated = if let Some(pos) = found {
        if !replaces_existing::<K, V, P>(&entries[pos].value, &incoming.value, ctx)? {
            return Ok(this.clone());
        }
        let mut replaced = entries.to_vec();
        replaced[pos] = incoming;
        replaced
    } else {
        let mut appended = Vec::with_capacity(entries.len() + 1);
        appended.extend(entries.iter().cloned());
        appended.push(incoming);
        appended
    };

    Ok(Bucket::Chain(Arc::new(CollisionChain::new(updated))))
}

// ---------------------------------------------------------------------------
// Trie node
// ---------------------------------------------------------------------------

fn add_to_trie<K, V, P: DuplicatePolicy>(
    this: &Bucket<K, V>,
    trie: &TrieNode<K, V>,
    incoming: Arc<Leaf<K, V>>,
    ctx: &AddContext<'_, K, V>,
) -> Result<Bucket<K, V>, P::Error> {
    let slot = trie.slot_of(incoming.hash);
    let pos = node::physical_index(trie.occupancy(), slot);

    if !trie.is_occupied(slot) {
        let children = node::children_inserting(trie.children(), pos, Bucket::Leaf(incoming));
        let new_node = TrieNode::from_parts(
            trie.rotation(),
            trie.occupancy() | node::mask(slot),
            children,
            trie.count() + 1,
        );
        return Ok(Bucket::Trie(Arc::new(new_node)));
    }

    let existing = &trie.children()[pos];
    // Any node created below picks fresh hash bits; the caller's suggestion is ignored.
    let suggested = trie.rotation() + node::BITS_PER_LEVEL;
    let added = add_recursive::<K, V, P>(existing, suggested, incoming, ctx)?;
    if added.ptr_eq(existing) {
        return Ok(this.clone());
    }

    let count = trie.count() - existing.count() + added.count();
    let children = node::children_replacing(trie.children(), pos, added);
    let new_node = TrieNode::from_parts(trie.rotation(), trie.occupancy(), children, count);
    Ok(Bucket::Trie(Arc::new(new_node)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Builds a two-child trie node from an existing bucket and a new leaf whose
/// hashes differ.
fn split<K, V>(
    suggested_rotation: u32,
    existing: &Bucket<K, V>,
    existing_hash: u32,
    incoming: Arc<Leaf<K, V>>,
) -> Bucket<K, V> {
    let incoming_hash = incoming.hash;
    let trie = TrieNode::split(
        suggested_rotation,
        existing.clone(),
        existing_hash,
        Bucket::Leaf(incoming),
        incoming_hash,
    );
    Bucket::Trie(Arc::new(trie))
}

/// Decides whether an incoming value replaces the stored one for the same key.
///
/// `Ok(false)` means the values are equal and the bucket stays as is.
fn replaces_existing<K, V, P: DuplicatePolicy>(
    existing: &V,
    incoming: &V,
    ctx: &AddContext<'_, K, V>,
) -> Result<bool, P::Error> {
    if ctx.value_eq.equals(existing, incoming) {
        return Ok(false);
    }
    P::on_conflict()?;
    Ok(true)
}
