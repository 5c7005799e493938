//! Deletion with top-down borrow/merge rebalancing.
//!
//! The descent never enters a child holding only the minimum `t - 1` keys:
//! such a child is first topped up by rotating a key in from a sibling
//! through the parent, or merged with a sibling around their separator.
//! Removing a key from whichever node the descent ends in therefore never
//! underflows, and no second upward pass is needed.
//!
//! ```text
//! borrow from left (rotate right)        merge children i and i+1
//!
//!        [ b ]                                [ b ]
//!       /     \          =>                  /     \         =>   [ a b c ]
//!   [ a x ]   [ c ]         [ a ] [ x c ]  [ a ]   [ c ]
//!   (x moves up, b moves down)
//! ```
//!
//! When a merge empties the root, its only child becomes the new root.

use std::borrow::Borrow;

use tracing::{debug, trace};

use crate::common::{Error, NodeId, Result};

use super::stats::TreeStats;
use super::tree::BTree;

impl<K: Ord, V> BTree<K, V> {
    /// Delete `key`, returning the value that was stored under it.
    ///
    /// The tree's copy of the key is dropped.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent; the tree is not restructured
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Delete `key`, returning the owned key and its value.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent; the tree is not restructured
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        TreeStats::bump(&self.stats.deletes);

        // Top-ups on the way down would reshape the tree even for a miss.
        if self.locate(key).is_none() {
            return Err(Error::NotFound);
        }

        let removed = self.delete_from(self.root, key);
        self.collapse_root();

        let entry = removed.ok_or(Error::NotFound)?;
        self.len -= 1;
        Ok(entry)
    }

    /// Remove `key` from the subtree at `id`.
    ///
    /// `id` is either the root or a node holding at least `t` keys.
    fn delete_from<Q>(&mut self, mut id: NodeId, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.min_degree();
        loop {
            let node = &self.arena[id];
            match node.find(key) {
                Ok(index) if node.is_leaf() => {
                    return Some(self.arena[id].remove_entry(index));
                }
                Ok(index) => {
                    let left = node.children[index];
                    let right = node.children[index + 1];

                    if self.arena[left].len() >= t {
                        let (k, v) = self.pop_max(left)?;
                        return Some(self.arena[id].replace_entry(index, k, v));
                    }
                    if self.arena[right].len() >= t {
                        let (k, v) = self.pop_min(right)?;
                        return Some(self.arena[id].replace_entry(index, k, v));
                    }

                    // Both neighbours are minimal: pull the key down into
                    // their merge and keep going there.
                    self.merge_children(id, index);
                    id = left;
                }
                Err(_) if node.is_leaf() => return None,
                Err(index) => {
                    let index = self.fill_child(id, index);
                    id = self.arena[id].children[index];
                }
            }
        }
    }

    /// Remove and return the largest entry of the subtree at `id`.
    fn pop_max(&mut self, mut id: NodeId) -> Option<(K, V)> {
        loop {
            let node = &self.arena[id];
            if node.is_leaf() {
                return self.arena[id].pop_entry();
            }
            let last = node.len();
            let index = self.fill_child(id, last);
            id = self.arena[id].children[index];
        }
    }

    /// Remove and return the smallest entry of the subtree at `id`.
    fn pop_min(&mut self, mut id: NodeId) -> Option<(K, V)> {
        loop {
            let node = &self.arena[id];
            if node.is_leaf() {
                if node.is_empty() {
                    return None;
                }
                return Some(self.arena[id].remove_entry(0));
            }
            let index = self.fill_child(id, 0);
            id = self.arena[id].children[index];
        }
    }

    // ========================================================================
    // Rebalancing
    // ========================================================================

    /// Make sure child `index` of `parent` holds at least `t` keys.
    ///
    /// Tries, in order: borrow from the left sibling, borrow from the right
    /// sibling, merge with the right sibling, merge with the left sibling.
    /// Returns the index of the child that now covers the original one's key
    /// range (it shifts left by one after a merge with the left sibling).
    fn fill_child(&mut self, parent: NodeId, index: usize) -> usize {
        let t = self.min_degree();
        let node = &self.arena[parent];
        let children = node.children();
        let separators = node.len();

        if self.arena[children[index]].len() >= t {
            return index;
        }

        let left_spare = index > 0 && self.arena[children[index - 1]].len() >= t;
        let right_spare = index < separators && self.arena[children[index + 1]].len() >= t;

        if left_spare {
            self.borrow_from_left(parent, index);
            index
        } else if right_spare {
            self.borrow_from_right(parent, index);
            index
        } else if index < separators {
            self.merge_children(parent, index);
            index
        } else {
            self.merge_children(parent, index - 1);
            index - 1
        }
    }

    /// Rotate the left sibling's last entry up into `parent`, and the
    /// separator down to the front of child `index`.
    fn borrow_from_left(&mut self, parent: NodeId, index: usize) {
        let left = self.arena[parent].children[index - 1];
        let child = self.arena[parent].children[index];

        let Some((key, value, edge)) = self.arena[left].pop_back() else {
            unreachable!("{left} was checked to have spare keys");
        };
        let (key, value) = self.arena[parent].replace_entry(index - 1, key, value);
        self.arena[child].push_front(key, value, edge);

        TreeStats::bump(&self.stats.borrows);
        trace!(parent = %parent, from = %left, to = %child, "borrowed from left sibling");
    }

    /// Rotate the right sibling's first entry up into `parent`, and the
    /// separator down to the back of child `index`.
    fn borrow_from_right(&mut self, parent: NodeId, index: usize) {
        let right = self.arena[parent].children[index + 1];
        let child = self.arena[parent].children[index];

        let Some((key, value, edge)) = self.arena[right].pop_front() else {
            unreachable!("{right} was checked to have spare keys");
        };
        let (key, value) = self.arena[parent].replace_entry(index, key, value);
        self.arena[child].push_back(key, value, edge);

        TreeStats::bump(&self.stats.borrows);
        trace!(parent = %parent, from = %right, to = %child, "borrowed from right sibling");
    }

    /// Merge child `index + 1` of `parent` into child `index`, pulling the
    /// separating entry down between them. The right node is freed.
    fn merge_children(&mut self, parent: NodeId, index: usize) {
        let (key, value, right) = self.arena[parent].remove_separator(index);
        let right_node = self.arena.free(right);
        let left = self.arena[parent].children[index];
        self.arena[left].absorb(key, value, right_node);

        TreeStats::bump(&self.stats.merges);
        trace!(parent = %parent, into = %left, freed = %right, "merged siblings");
    }

    /// Replace an empty internal root by its only child.
    fn collapse_root(&mut self) {
        let root = &self.arena[self.root];
        if !root.is_empty() || root.is_leaf() {
            return;
        }

        let old_root = self.root;
        let new_root = root.children[0];
        self.arena.free(old_root);
        self.root = new_root;

        TreeStats::bump(&self.stats.root_collapses);
        debug!(old_root = %old_root, new_root = %new_root, "root collapsed, tree shrank");
    }
}
