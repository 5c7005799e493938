//! B-tree node layout and in-node primitives.
//!
//! A [`Node`] stores up to `order - 1` sorted key/value pairs. Internal nodes
//! also hold `len() + 1` child references:
//! - `children[i]` contains keys < `keys[i]`
//! - `children[i + 1]` contains keys > `keys[i]`
//!
//! Everything here touches a single node. Moving entries between nodes
//! (split, borrow, merge) is driven by the tree, one node at a time, using
//! the primitives below.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::mem;

use crate::common::NodeId;

/// A single B-tree node.
///
/// `keys` and `values` are parallel vectors. A node is a leaf exactly when it
/// has no children.
#[derive(Debug)]
pub struct Node<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) children: Vec<NodeId>,
}

impl<K, V> Node<K, V> {
    /// Create an empty leaf with room for `max_keys` entries.
    pub fn leaf(max_keys: usize) -> Self {
        Self {
            keys: Vec::with_capacity(max_keys),
            values: Vec::with_capacity(max_keys),
            children: Vec::new(),
        }
    }

    /// Create an empty internal node whose only child is `child`.
    ///
    /// This is the shape of a new root right before the old root is split.
    pub fn with_only_child(max_keys: usize, child: NodeId) -> Self {
        let mut children = Vec::with_capacity(max_keys + 1);
        children.push(child);
        Self {
            keys: Vec::with_capacity(max_keys),
            values: Vec::with_capacity(max_keys),
            children,
        }
    }

    /// Number of keys in the node.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the node holds no keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether the node has no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether the node holds `max_keys` keys and must be split before an insert.
    #[inline]
    pub fn is_full(&self, max_keys: usize) -> bool {
        self.keys.len() >= max_keys
    }

    /// Sorted keys of this node.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Child references, empty for a leaf.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Locate `key` inside this node.
    ///
    /// Returns `Ok(i)` if `keys[i] == key`, otherwise `Err(i)` where `i` is the
    /// index of the first key greater than `key` (and so the child to descend
    /// into).
    pub fn find<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.binary_search_by(|probe| probe.borrow().cmp(key))
    }

    // ========================================================================
    // Leaf and separator edits
    // ========================================================================

    /// Insert an entry at `index`, shifting later entries right.
    pub fn insert_entry(&mut self, index: usize, key: K, value: V) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
    }

    /// Remove the entry at `index`, shifting later entries left.
    pub fn remove_entry(&mut self, index: usize) -> (K, V) {
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Remove the last entry of a leaf.
    pub fn pop_entry(&mut self) -> Option<(K, V)> {
        match (self.keys.pop(), self.values.pop()) {
            (Some(k), Some(v)) => Some((k, v)),
            _ => None,
        }
    }

    /// Put `key`/`value` in slot `index`, returning the entry that was there.
    pub fn replace_entry(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (
            mem::replace(&mut self.keys[index], key),
            mem::replace(&mut self.values[index], value),
        )
    }

    // ========================================================================
    // Split
    // ========================================================================

    /// Split a full node around its median.
    ///
    /// The upper half of the entries (and children) move into the returned
    /// sibling; the median entry is returned for promotion into the parent.
    /// With `2t - 1` keys both halves end up with `t - 1`.
    pub fn split(&mut self) -> (K, V, Node<K, V>) {
        let mid = self.keys.len() / 2;
        let capacity = self.keys.capacity();

        let mut upper_keys = self.keys.split_off(mid);
        let mut upper_values = self.values.split_off(mid);
        let upper_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(mid + 1)
        };

        let median_key = upper_keys.remove(0);
        let median_value = upper_values.remove(0);

        upper_keys.reserve(capacity.saturating_sub(upper_keys.len()));
        upper_values.reserve(capacity.saturating_sub(upper_values.len()));

        let sibling = Node {
            keys: upper_keys,
            values: upper_values,
            children: upper_children,
        };

        (median_key, median_value, sibling)
    }

    /// Insert a promoted median at `index` with `right` as its right child.
    pub fn insert_separator(&mut self, index: usize, key: K, value: V, right: NodeId) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
        self.children.insert(index + 1, right);
    }

    // ========================================================================
    // Borrow and merge
    // ========================================================================

    /// Take the largest entry (and rightmost child) off this node.
    ///
    /// Used on a left sibling that lends to its right neighbour.
    pub fn pop_back(&mut self) -> Option<(K, V, Option<NodeId>)> {
        let (key, value) = self.pop_entry()?;
        Some((key, value, self.children.pop()))
    }

    /// Take the smallest entry (and leftmost child) off this node.
    ///
    /// Used on a right sibling that lends to its left neighbour.
    pub fn pop_front(&mut self) -> Option<(K, V, Option<NodeId>)> {
        if self.keys.is_empty() {
            return None;
        }
        let (key, value) = self.remove_entry(0);
        let child = if self.is_leaf() {
            None
        } else {
            Some(self.children.remove(0))
        };
        Some((key, value, child))
    }

    /// Prepend an entry that rotated down from the parent.
    pub fn push_front(&mut self, key: K, value: V, child: Option<NodeId>) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Append an entry that rotated down from the parent.
    pub fn push_back(&mut self, key: K, value: V, child: Option<NodeId>) {
        self.keys.push(key);
        self.values.push(value);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Remove separator `index` together with the child to its right.
    ///
    /// This is the parent's half of a merge of `children[index]` and
    /// `children[index + 1]`.
    pub fn remove_separator(&mut self, index: usize) -> (K, V, NodeId) {
        let key = self.keys.remove(index);
        let value = self.values.remove(index);
        let right = self.children.remove(index + 1);
        (key, value, right)
    }

    /// Take all entries from `right`, separated by `key`/`value`.
    pub fn absorb(&mut self, key: K, value: V, right: Node<K, V>) {
        self.keys.push(key);
        self.values.push(value);
        self.keys.extend(right.keys);
        self.values.extend(right.values);
        self.children.extend(right.children);
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Whether keys are strictly increasing.
    pub fn is_sorted(&self) -> bool {
        self.keys
            .windows(2)
            .all(|pair| pair[0].cmp(&pair[1]) == Ordering::Less)
    }
}
