//! The root container.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::ops;
use std::sync::Arc;

use tracing::debug;

use crate::equality::{Comparers, KeyEquality, ValueEquality};
use crate::error::{MapError, Result};
use crate::iter::{Iter, Keys, Leaves, Values};
use crate::node::{Bucket, Leaf};
use crate::ops::add::{AddContext, DuplicatePolicy, Overwrite, Reject, add_recursive};
use crate::ops::get::get_recursive;
use crate::ops::remove::remove_recursive;
use crate::registry;

/// Immutable hash map with structural sharing.
///
/// Every "mutation" returns a new map; the receiver is left untouched and
/// shares all unmodified nodes with the result. Cloning is O(1).
///
/// Iteration order follows the trie layout. It is unrelated to insertion
/// order and may differ between maps with equal contents.
pub struct ImmutableHashMap<K, V> {
    root: Option<Bucket<K, V>>,
    comparers: Comparers<K, V>,
}

// ---------------------------------------------------------------------------
// Construction: default comparers need `K: Hash + Eq`, `V: PartialEq`
// ---------------------------------------------------------------------------

impl<K, V> ImmutableHashMap<K, V>
where
    K: Hash + Eq + 'static,
    V: PartialEq + 'static,
{
    /// Returns the canonical empty map with default comparers.
    ///
    /// All calls for the same `K` and `V` return maps that are
    /// [`ptr_eq`](Self::ptr_eq) to each other.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_comparers(registry::default_comparers())
    }
}

// ---------------------------------------------------------------------------
// Construction & accessors: no trait bounds
// ---------------------------------------------------------------------------

impl<K, V> ImmutableHashMap<K, V> {
    /// Creates an empty map using the given strategies.
    #[must_use]
    pub const fn from_comparers(comparers: Comparers<K, V>) -> Self {
        Self {
            root: None,
            comparers,
        }
    }

    /// Creates an empty map with a custom key and value strategy.
    #[must_use]
    pub fn with_equality(
        key_eq: Arc<dyn KeyEquality<K>>,
        value_eq: Arc<dyn ValueEquality<V>>,
    ) -> Self {
        Self::from_comparers(Comparers::new(key_eq, value_eq))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, Bucket::count)
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The key strategy.
    #[must_use]
    pub const fn key_equality(&self) -> &Arc<dyn KeyEquality<K>> {
        &self.comparers.key
    }

    /// The value strategy.
    #[must_use]
    pub const fn value_equality(&self) -> &Arc<dyn ValueEquality<V>> {
        &self.comparers.value
    }

    /// Both strategies.
    #[must_use]
    pub const fn comparers(&self) -> &Comparers<K, V> {
        &self.comparers
    }

    /// Returns `true` if both maps are the same snapshot: identical root
    /// node and identical strategies.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        let same_root = match (&self.root, &other.root) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        same_root && self.comparers.ptr_eq(&other.comparers)
    }

    /// Root bucket, for structural inspection.
    #[must_use]
    pub const fn root(&self) -> Option<&Bucket<K, V>> {
        self.root.as_ref()
    }

    /// Returns an empty map carrying this map's strategies.
    #[must_use]
    pub fn clear(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }
        Self::from_comparers(self.comparers.clone())
    }

    /// Returns a map with `root` and this map's strategies, or `self` again
    /// if the root did not change.
    fn wrap(&self, root: Option<Bucket<K, V>>) -> Self {
        match (root, &self.root) {
            (None, _) => self.clear(),
            (Some(new_root), Some(old_root)) if new_root.ptr_eq(old_root) => self.clone(),
            (Some(new_root), _) => Self {
                root: Some(new_root),
                comparers: self.comparers.clone(),
            },
        }
    }

    fn leaf(&self, key: &K) -> Option<&Leaf<K, V>> {
        let root = self.root.as_ref()?;
        let key_eq = &*self.comparers.key;
        get_recursive(root, key_eq.hash(key), key, key_eq)
    }
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

impl<K, V> ImmutableHashMap<K, V> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.leaf(key).map(|leaf| &leaf.value)
    }

    /// Indexed lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::KeyNotFound`] if `key` is absent.
    pub fn item(&self, key: &K) -> Result<&V> {
        self.get(key).ok_or(MapError::KeyNotFound)
    }

    /// Returns the stored key equal to `key`.
    ///
    /// Useful when the key strategy is looser than identity and the caller
    /// wants the canonical instance held by the map.
    #[must_use]
    pub fn get_key(&self, key: &K) -> Option<&K> {
        self.leaf(key).map(|leaf| &leaf.key)
    }

    /// Returns the stored key and its value.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.leaf(key).map(|leaf| (&leaf.key, &leaf.value))
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.leaf(key).is_some()
    }

    /// Returns `true` if `key` maps to a value equal to `value`.
    #[must_use]
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.get(key)
            .is_some_and(|stored| self.comparers.value.equals(stored, value))
    }

    /// Returns `true` if any entry holds a value equal to `value`.
    ///
    /// Linear in the number of entries.
    #[must_use]
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|stored| self.comparers.value.equals(stored, value))
    }
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

impl<K, V> ImmutableHashMap<K, V> {
    /// Returns a map with `key` mapped to `value`.
    ///
    /// Adding a key that is already mapped to an equal value returns this
    /// map unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateKey`] if `key` is mapped to a different
    /// value.
    pub fn add(&self, key: K, value: V) -> Result<Self> {
        self.insert::<Reject>(key, value)
    }

    /// Returns a map with `key` mapped to `value`, replacing any existing
    /// value.
    ///
    /// Returns this map unchanged if the stored value is already equal.
    #[must_use]
    pub fn set_item(&self, key: K, value: V) -> Self {
        let Ok(map) = self.insert::<Overwrite>(key, value);
        map
    }

    /// Adds every pair in order, as repeated [`add`](Self::add).
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateKey`] on the first pair whose key is
    /// already mapped to a different value, including keys repeated
    /// within `pairs`.
    pub fn add_range<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Result<Self> {
        pairs
            .into_iter()
            .try_fold(self.clone(), |map, (key, value)| map.add(key, value))
    }

    /// Sets every pair in order, as repeated [`set_item`](Self::set_item).
    /// Later pairs win.
    #[must_use]
    pub fn set_items<I: IntoIterator<Item = (K, V)>>(&self, pairs: I) -> Self {
        pairs
            .into_iter()
            .fold(self.clone(), |map, (key, value)| map.set_item(key, value))
    }

    /// Returns a map without `key`, or this map unchanged if it is absent.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        let Some(root) = &self.root else {
            return self.clone();
        };
        let key_eq = &*self.comparers.key;
        self.wrap(remove_recursive(root, key_eq.hash(key), key, key_eq))
    }

    /// Removes every key in order, as repeated [`remove`](Self::remove).
    #[must_use]
    pub fn remove_range<I>(&self, keys: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<K>,
    {
        let key_eq = &*self.comparers.key;
        let mut root = self.root.clone();
        for key in keys {
            let Some(current) = &root else {
                break;
            };
            let key = key.borrow();
            root = remove_recursive(current, key_eq.hash(key), key, key_eq);
        }
        self.wrap(root)
    }

    fn insert<P: DuplicatePolicy>(&self, key: K, value: V) -> Result<Self, P::Error> {
        let key_eq = &*self.comparers.key;
        let incoming = Arc::new(Leaf::new(key_eq.hash(&key), key, value));

        let Some(root) = &self.root else {
            return Ok(self.wrap(Some(Bucket::Leaf(incoming))));
        };

        let ctx = AddContext {
            key_eq,
            value_eq: &*self.comparers.value,
        };
        let added = add_recursive::<K, V, P>(root, 0, incoming, &ctx)?;
        Ok(self.wrap(Some(added)))
    }
}

// ---------------------------------------------------------------------------
// Comparer changes and bulk copies: entries are re-inserted, so K, V: Clone
// ---------------------------------------------------------------------------

impl<K: Clone, V: Clone> ImmutableHashMap<K, V> {
    /// Returns a map with the same contents under new strategies.
    ///
    /// Swapping only the value strategy keeps the trie as is. A new key
    /// strategy rebuilds the map by setting every entry in iteration order;
    /// if it merges previously distinct keys, the entry visited last wins.
    #[must_use]
    pub fn with_comparers(
        &self,
        key_eq: Arc<dyn KeyEquality<K>>,
        value_eq: Arc<dyn ValueEquality<V>>,
    ) -> Self {
        if Arc::ptr_eq(&self.comparers.key, &key_eq) {
            if Arc::ptr_eq(&self.comparers.value, &value_eq) {
                return self.clone();
            }
            // The trie layout does not depend on value equality.
            return Self {
                root: self.root.clone(),
                comparers: Comparers::new(key_eq, value_eq),
            };
        }

        debug!(len = self.len(), "rebuilding map under a new key equality");
        Self::with_equality(key_eq, value_eq).set_items(self.cloned_pairs())
    }

    /// Like [`with_comparers`](Self::with_comparers), keeping the current
    /// value strategy.
    #[must_use]
    pub fn with_key_equality(&self, key_eq: Arc<dyn KeyEquality<K>>) -> Self {
        self.with_comparers(key_eq, Arc::clone(&self.comparers.value))
    }

    /// Adds every entry of `other`, as [`add_range`](Self::add_range).
    ///
    /// When this map is empty and both maps share the key strategy, `other`'s
    /// trie is reused instead of being re-inserted entry by entry.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateKey`] if a key of `other` is already
    /// mapped to a different value here, including keys of `other` that
    /// this map's key strategy treats as equal.
    pub fn add_range_from(&self, other: &Self) -> Result<Self> {
        // Only an unchanged key strategy keeps `other`'s keys distinct.
        if self.is_empty() && Arc::ptr_eq(&self.comparers.key, &other.comparers.key) {
            return Ok(self.adopt(other));
        }
        self.add_range(other.cloned_pairs())
    }

    /// Sets every entry of `other`, as [`set_items`](Self::set_items).
    ///
    /// When this map is empty, `other`'s trie is reused under this map's
    /// strategies.
    #[must_use]
    pub fn set_items_from(&self, other: &Self) -> Self {
        if self.is_empty() {
            return self.adopt(other);
        }
        self.set_items(other.cloned_pairs())
    }

    fn adopt(&self, other: &Self) -> Self {
        other.with_comparers(
            Arc::clone(&self.comparers.key),
            Arc::clone(&self.comparers.value),
        )
    }

    fn cloned_pairs(&self) -> impl Iterator<Item = (K, V)> + '_ {
        self.iter().map(|(k, v)| (k.clone(), v.clone()))
    }
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

impl<K, V> ImmutableHashMap<K, V> {
    /// Returns an iterator over `(&K, &V)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_ref())
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.root.as_ref())
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.root.as_ref())
    }

    /// Returns an iterator over the stored leaves.
    #[must_use]
    pub fn leaves(&self) -> Leaves<'_, K, V> {
        Leaves::new(self.root.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V> Clone for ImmutableHashMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            comparers: self.comparers.clone(),
        }
    }
}

impl<K, V> Default for ImmutableHashMap<K, V>
where
    K: Hash + Eq + 'static,
    V: PartialEq + 'static,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<K, V> fmt::Debug for ImmutableHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableHashMap")
            .field("len", &self.len())
            .field("comparers", &self.comparers)
            .finish_non_exhaustive()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for ImmutableHashMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ImmutableHashMap[")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{key}:{value}")?;
        }
        f.write_str("]")
    }
}

impl<K, V> Extend<(K, V)> for ImmutableHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        *self = self.set_items(iter);
    }
}

impl<K, V> FromIterator<(K, V)> for ImmutableHashMap<K, V>
where
    K: Hash + Eq + 'static,
    V: PartialEq + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::empty().set_items(iter)
    }
}

impl<K, V> ops::Index<&K> for ImmutableHashMap<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V> IntoIterator for &'a ImmutableHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
