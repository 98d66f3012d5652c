//! Key and value equality strategies.
//!
//! A map's key strategy must be self-consistent:
//! `equals(a, b)` implies `hash(a) == hash(b)`. This is a precondition, not
//! something the map checks; breaking it makes present keys unreachable.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

/// Hashing and equality for keys.
pub trait KeyEquality<K>: Send + Sync {
    /// Returns the 32-bit hash of `key`.
    fn hash(&self, key: &K) -> u32;

    /// Returns `true` if `a` and `b` denote the same key.
    fn equals(&self, a: &K, b: &K) -> bool;
}

/// Equality for values.
///
/// Used to detect no-op writes; the trie layout never depends on it.
pub trait ValueEquality<V>: Send + Sync {
    /// Returns `true` if `a` and `b` are interchangeable values.
    fn equals(&self, a: &V, b: &V) -> bool;
}

/// Key equality via [`Hash`] + [`Eq`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultKeyEquality;

/// Value equality via [`PartialEq`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueEquality;

/// Computes the 32-bit hash of a value using the standard hasher.
///
/// The 64-bit digest is folded so both halves contribute to every slot.
#[must_use]
pub fn hash_one<T: Hash + ?Sized>(value: &T) -> u32 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    let h = hasher.finish();
    #[allow(clippy::cast_possible_truncation)]
    let folded = (h ^ (h >> 32)) as u32;
    folded
}

impl<K: Hash + Eq> KeyEquality<K> for DefaultKeyEquality {
    fn hash(&self, key: &K) -> u32 {
        hash_one(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

impl<V: PartialEq> ValueEquality<V> for DefaultValueEquality {
    fn equals(&self, a: &V, b: &V) -> bool {
        a == b
    }
}

/// Key equality built from a pair of closures.
pub struct FnKeyEquality<H, E> {
    hash: H,
    equals: E,
}

impl<H, E> FnKeyEquality<H, E> {
    /// Wraps a hash function and an equality function.
    pub const fn new(hash: H, equals: E) -> Self {
        Self { hash, equals }
    }
}

impl<K, H, E> KeyEquality<K> for FnKeyEquality<H, E>
where
    H: Fn(&K) -> u32 + Send + Sync,
    E: Fn(&K, &K) -> bool + Send + Sync,
{
    fn hash(&self, key: &K) -> u32 {
        (self.hash)(key)
    }

    fn equals(&self, a: &K, b: &K) -> bool {
        (self.equals)(a, b)
    }
}

/// Value equality built from a closure.
pub struct FnValueEquality<E> {
    equals: E,
}

impl<E> FnValueEquality<E> {
    /// Wraps an equality function.
    pub const fn new(equals: E) -> Self {
        Self { equals }
    }
}

impl<V, E> ValueEquality<V> for FnValueEquality<E>
where
    E: Fn(&V, &V) -> bool + Send + Sync,
{
    fn equals(&self, a: &V, b: &V) -> bool {
        (self.equals)(a, b)
    }
}

/// The key and value strategies a map was built with.
///
/// Strategies are compared by identity ([`Arc::ptr_eq`]), so two maps share a
/// configuration only if they hold the same `Arc`s.
pub struct Comparers<K, V> {
    /// Key hashing and equality.
    pub key: Arc<dyn KeyEquality<K>>,
    /// Value equality.
    pub value: Arc<dyn ValueEquality<V>>,
}

impl<K, V> Comparers<K, V> {
    /// Bundles a key and a value strategy.
    #[must_use]
    pub fn new(key: Arc<dyn KeyEquality<K>>, value: Arc<dyn ValueEquality<V>>) -> Self {
        Self { key, value }
    }

    /// Returns `true` if both strategies are the same instances.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.key, &other.key) && Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<K, V> Clone for Comparers<K, V> {
    fn clone(&self) -> Self {
        Self {
            key: Arc::clone(&self.key),
            value: Arc::clone(&self.value),
        }
    }
}

impl<K, V> fmt::Debug for Comparers<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparers")
            .field("key", &Arc::as_ptr(&self.key).cast::<()>())
            .field("value", &Arc::as_ptr(&self.value).cast::<()>())
            .finish()
    }
}
