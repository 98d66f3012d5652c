//! Iterator types for [`ImmutableHashMap`](crate::ImmutableHashMap).
//!
//! Traversal is depth-first over an explicit stack of child iterators, so
//! trie depth never turns into call-stack depth.

use std::iter::FusedIterator;

use crate::node::{Bucket, Child, Children, Leaf};

/// Iterator over the leaves of a trie.
///
/// Yields every entry exactly once, in trie layout order.
pub struct Leaves<'a, K, V> {
    stack: Vec<Children<'a, K, V>>,
    remaining: usize,
}

impl<'a, K, V> Leaves<'a, K, V> {
    /// Starts a traversal at `root`.
    #[must_use]
    pub fn new(root: Option<&'a Bucket<K, V>>) -> Self {
        match root {
            Some(bucket) => Self {
                stack: vec![bucket.children()],
                remaining: bucket.count(),
            },
            None => Self {
                stack: Vec::new(),
                remaining: 0,
            },
        }
    }
}

impl<'a, K, V> Iterator for Leaves<'a, K, V> {
    type Item = &'a Leaf<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            match frame.next() {
                Some(Child::Leaf(leaf)) => {
                    self.remaining -= 1;
                    return Some(leaf);
                }
                Some(Child::Nested(bucket)) => self.stack.push(bucket.children()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Leaves<'_, K, V> {}

impl<K, V> FusedIterator for Leaves<'_, K, V> {}

/// Iterator over `(&K, &V)` pairs.
pub struct Iter<'a, K, V> {
    leaves: Leaves<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Bucket<K, V>>) -> Self {
        Self {
            leaves: Leaves::new(root),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.leaves.next().map(|leaf| (&leaf.key, &leaf.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.leaves.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over keys.
pub struct Keys<'a, K, V> {
    leaves: Leaves<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Bucket<K, V>>) -> Self {
        Self {
            leaves: Leaves::new(root),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.leaves.next().map(|leaf| &leaf.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.leaves.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Iterator over values.
pub struct Values<'a, K, V> {
    leaves: Leaves<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Bucket<K, V>>) -> Self {
        Self {
            leaves: Leaves::new(root),
        }
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.leaves.next().map(|leaf| &leaf.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.leaves.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}
