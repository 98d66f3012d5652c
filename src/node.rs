//! Bucket hierarchy and bitmap helpers.

use std::fmt;
use std::iter;
use std::slice;
use std::sync::Arc;

use tracing::{error, trace};

/// Bits consumed per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Number of logical slots in a trie node.
pub const SLOT_COUNT: u32 = 1 << BITS_PER_LEVEL;

const SLOT_MASK: u32 = SLOT_COUNT - 1;

/// One key-value pair together with the key's 32-bit hash.
pub struct Leaf<K, V> {
    /// Hash of the key under the owning map's key equality.
    pub hash: u32,
    /// The key.
    pub key: K,
    /// The value.
    pub value: V,
}

/// Leaves whose keys are distinct but share the exact same hash.
///
/// Invariant: `entries.len() >= 2` and every entry has hash `hash`.
pub struct CollisionChain<K, V> {
    hash: u32,
    entries: Vec<Arc<Leaf<K, V>>>,
}

/// Bitmap-compressed internal node with up to 32 children.
///
/// Invariants: `children.len() == popcount(occupancy) >= 2` and
/// `count` is the sum of the children's counts.
pub struct TrieNode<K, V> {
    rotation: u32,
    occupancy: u32,
    children: Vec<Bucket<K, V>>,
    count: usize,
}

/// A node of the trie.
///
/// Every variant is shared behind an [`Arc`]; cloning a bucket never copies
/// keys or values.
pub enum Bucket<K, V> {
    /// A single entry.
    Leaf(Arc<Leaf<K, V>>),
    /// Entries with identical hashes.
    Chain(Arc<CollisionChain<K, V>>),
    /// Internal bitmap node.
    Trie(Arc<TrieNode<K, V>>),
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Bit-parallel population count of a 32-bit word.
#[inline]
#[must_use]
pub const fn popcount(word: u32) -> u32 {
    let v = word - ((word >> 1) & 0x5555_5555);
    let v = (v & 0x3333_3333) + ((v >> 2) & 0x3333_3333);
    ((v + (v >> 4)) & 0x0F0F_0F0F).wrapping_mul(0x0101_0101) >> 24
}

/// Maps `hash` to a logical slot (0..31) for a node with the given rotation.
#[inline]
#[must_use]
pub const fn logical_slot(hash: u32, rotation: u32) -> u32 {
    hash.rotate_right(rotation & SLOT_MASK) & SLOT_MASK
}

/// Returns the single-bit mask for a logical slot.
#[inline]
#[must_use]
pub const fn mask(slot: u32) -> u32 {
    1 << slot
}

/// Returns the dense array position of `slot` within `occupancy`.
///
/// Counts the occupied slots below `slot`.
#[inline]
#[must_use]
pub const fn physical_index(occupancy: u32, slot: u32) -> usize {
    popcount(occupancy & (mask(slot) - 1)) as usize
}

// ---------------------------------------------------------------------------
// Leaf
// ---------------------------------------------------------------------------

impl<K, V> Leaf<K, V> {
    /// Creates a leaf from a precomputed hash.
    #[must_use]
    pub const fn new(hash: u32, key: K, value: V) -> Self {
        Self { hash, key, value }
    }
}

// ---------------------------------------------------------------------------
// CollisionChain
// ---------------------------------------------------------------------------

impl<K, V> CollisionChain<K, V> {
    /// Builds a chain from at least two equal-hash leaves.
    pub(crate) fn new(entries: Vec<Arc<Leaf<K, V>>>) -> Self {
        debug_assert!(entries.len() >= 2, "collision chain needs two entries");
        let hash = entries[0].hash;
        debug_assert!(entries.iter().all(|e| e.hash == hash));
        trace!(hash, len = entries.len(), "collision chain");
        Self { hash, entries }
    }

    /// The hash shared by every entry.
    #[must_use]
    pub const fn hash(&self) -> u32 {
        self.hash
    }

    /// The entries, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[Arc<Leaf<K, V>>] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; a chain holds at least two entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// TrieNode
// ---------------------------------------------------------------------------

impl<K, V> TrieNode<K, V> {
    /// Assembles a node from its parts.
    pub(crate) fn from_parts(
        rotation: u32,
        occupancy: u32,
        children: Vec<Bucket<K, V>>,
        count: usize,
    ) -> Self {
        debug_assert_eq!(children.len(), popcount(occupancy) as usize);
        debug_assert_eq!(count, children.iter().map(Bucket::count).sum::<usize>());
        Self {
            rotation: rotation & SLOT_MASK,
            occupancy,
            children,
            count,
        }
    }

    /// Builds a two-child node housing `first` and `second`.
    ///
    /// Tries rotations `suggested, suggested + 1, …` (mod 32) and keeps the
    /// first one that sends the two hashes to different logical slots.
    ///
    /// # Panics
    ///
    /// Panics if no rotation separates the hashes, which only happens when
    /// `first_hash == second_hash`.
    pub(crate) fn split(
        suggested: u32,
        first: Bucket<K, V>,
        first_hash: u32,
        second: Bucket<K, V>,
        second_hash: u32,
    ) -> Self {
        for step in 0..SLOT_COUNT {
            let rotation = suggested.wrapping_add(step) & SLOT_MASK;
            let s1 = logical_slot(first_hash, rotation);
            let s2 = logical_slot(second_hash, rotation);
            if s1 != s2 {
                trace!(rotation, first_hash, second_hash, "trie node");
                let count = first.count() + second.count();
                let children = if s1 < s2 {
                    vec![first, second]
                } else {
                    vec![second, first]
                };
                return Self::from_parts(rotation, mask(s1) | mask(s2), children, count);
            }
        }

        error!(first_hash, second_hash, "no rotation separates hashes");
        panic!("rotation search exhausted for hashes {first_hash:#010x} and {second_hash:#010x}");
    }

    /// Rotation applied to hashes before slot extraction.
    #[must_use]
    pub const fn rotation(&self) -> u32 {
        self.rotation
    }

    /// Occupancy bitmap; bit `p` set means logical slot `p` holds a child.
    #[must_use]
    pub const fn occupancy(&self) -> u32 {
        self.occupancy
    }

    /// Children in dense (physical) order.
    #[must_use]
    pub fn children(&self) -> &[Bucket<K, V>] {
        &self.children
    }

    /// Number of entries below this node.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Logical slot of `hash` in this node.
    #[inline]
    #[must_use]
    pub const fn slot_of(&self, hash: u32) -> u32 {
        logical_slot(hash, self.rotation)
    }

    /// Returns `true` if logical `slot` holds a child.
    #[inline]
    #[must_use]
    pub const fn is_occupied(&self, slot: u32) -> bool {
        self.occupancy & mask(slot) != 0
    }
}

// ---------------------------------------------------------------------------
// Bucket accessors
// ---------------------------------------------------------------------------

impl<K, V> Bucket<K, V> {
    /// Number of entries stored in this bucket.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Leaf(_) => 1,
            Self::Chain(chain) => chain.len(),
            Self::Trie(node) => node.count,
        }
    }

    /// Shared hash of a leaf or chain; `None` for trie nodes.
    #[must_use]
    pub fn hash(&self) -> Option<u32> {
        match self {
            Self::Leaf(leaf) => Some(leaf.hash),
            Self::Chain(chain) => Some(chain.hash),
            Self::Trie(_) => None,
        }
    }

    /// Returns `true` if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Leaf(a), Self::Leaf(b)) => Arc::ptr_eq(a, b),
            (Self::Chain(a), Self::Chain(b)) => Arc::ptr_eq(a, b),
            (Self::Trie(a), Self::Trie(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Direct children of this bucket.
    ///
    /// A leaf yields itself, a chain yields its entries and a trie node
    /// yields its child buckets.
    #[must_use]
    pub fn children(&self) -> Children<'_, K, V> {
        let inner = match self {
            Self::Leaf(leaf) => ChildrenInner::Single(iter::once(&**leaf)),
            Self::Chain(chain) => ChildrenInner::Leaves(chain.entries.iter()),
            Self::Trie(node) => ChildrenInner::Buckets(node.children.iter()),
        };
        Children { inner }
    }
}

// ---------------------------------------------------------------------------
// Child enumeration
// ---------------------------------------------------------------------------

/// One step of a child enumeration.
pub enum Child<'a, K, V> {
    /// An entry.
    Leaf(&'a Leaf<K, V>),
    /// A bucket that has children of its own.
    Nested(&'a Bucket<K, V>),
}

/// Iterator over the direct children of a [`Bucket`].
pub struct Children<'a, K, V> {
    inner: ChildrenInner<'a, K, V>,
}

enum ChildrenInner<'a, K, V> {
    Single(iter::Once<&'a Leaf<K, V>>),
    Leaves(slice::Iter<'a, Arc<Leaf<K, V>>>),
    Buckets(slice::Iter<'a, Bucket<K, V>>),
}

impl<'a, K, V> Iterator for Children<'a, K, V> {
    type Item = Child<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            ChildrenInner::Single(it) => it.next().map(Child::Leaf),
            ChildrenInner::Leaves(it) => it.next().map(|leaf| Child::Leaf(&**leaf)),
            ChildrenInner::Buckets(it) => it.next().map(|bucket| match bucket {
                Bucket::Leaf(leaf) => Child::Leaf(&**leaf),
                Bucket::Chain(_) | Bucket::Trie(_) => Child::Nested(bucket),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Manual trait impls: avoid false `K: Trait, V: Trait` bounds.
// ---------------------------------------------------------------------------

impl<K, V> Clone for Bucket<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(Arc::clone(leaf)),
            Self::Chain(chain) => Self::Chain(Arc::clone(chain)),
            Self::Trie(node) => Self::Trie(Arc::clone(node)),
        }
    }
}

impl<K, V> fmt::Debug for Bucket<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(leaf) => f
                .debug_struct("Leaf")
                .field("hash", &format_args!("{:#010x}", leaf.hash))
                .finish_non_exhaustive(),
            Self::Chain(chain) => f
                .debug_struct("Chain")
                .field("hash", &format_args!("{:#010x}", chain.hash))
                .field("len", &chain.len())
                .finish(),
            Self::Trie(node) => f
                .debug_struct("Trie")
                .field("rotation", &node.rotation)
                .field("occupancy", &format_args!("{:#034b}", node.occupancy))
                .field("count", &node.count)
                .field("children", &node.children)
                .finish(),
        }
    }
}

// ---------------------------------------------------------------------------
// Child array builders
// ---------------------------------------------------------------------------

/// Copies `children` with `child` inserted at `at`.
pub(crate) fn children_inserting<K, V>(
    children: &[Bucket<K, V>],
    at: usize,
    child: Bucket<K, V>,
) -> Vec<Bucket<K, V>> {
    let mut out = Vec::with_capacity(children.len() + 1);
    out.extend_from_slice(&children[..at]);
    out.push(child);
    out.extend_from_slice(&children[at..]);
    out
}

/// Copies `children` with the child at `at` replaced by `child`.
pub(crate) fn children_replacing<K, V>(
    children: &[Bucket<K, V>],
    at: usize,
    child: Bucket<K, V>,
) -> Vec<Bucket<K, V>> {
    let mut out = children.to_vec();
    out[at] = child;
    out
}

/// Copies `children` without the child at `at`.
pub(crate) fn children_removing<K, V>(children: &[Bucket<K, V>], at: usize) -> Vec<Bucket<K, V>> {
    let mut out = Vec::with_capacity(children.len() - 1);
    out.extend_from_slice(&children[..at]);
    out.extend_from_slice(&children[at + 1..]);
    out
}
