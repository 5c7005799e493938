//! Insertion with preemptive top-down splitting.
//!
//! Before the descent enters a full child, that child is split, so the entry
//! always lands in a leaf with room to spare. A full root is split before
//! the descent begins; this is the only place the tree grows taller.

use std::mem;

use tracing::{debug, trace};

use crate::common::{DuplicatePolicy, Error, NodeId, Result};

use super::node::Node;
use super::stats::TreeStats;
use super::tree::BTree;

impl<K: Ord, V> BTree<K, V> {
    /// Insert `value` under `key`.
    ///
    /// Returns `Ok(None)` when the key was new. When the key already exists
    /// the configured [`DuplicatePolicy`] applies:
    /// - `Reject`: fails with `Error::DuplicateKey`
    /// - `Overwrite`: stores `value` and returns `Ok(Some(old))`
    ///
    /// # Errors
    /// - `Error::DuplicateKey` for an existing key under `Reject`
    /// - `Error::AllocationFailure` if the nodes needed for splitting cannot
    ///   be allocated; the tree is left exactly as it was
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        TreeStats::bump(&self.stats.inserts);

        let policy = self.config.duplicates;
        if let Some((id, index)) = self.locate(&key) {
            return match policy {
                DuplicatePolicy::Reject => Err(Error::DuplicateKey),
                DuplicatePolicy::Overwrite => {
                    let slot = &mut self.arena[id].values[index];
                    Ok(Some(mem::replace(slot, value)))
                }
            };
        }

        // Every fallible step happens here, before any node changes.
        let needed = self.nodes_needed_for(&key);
        self.arena.reserve(needed)?;

        let max_keys = self.config.max_keys();
        if self.arena[self.root].is_full(max_keys) {
            self.grow_root();
        }
        self.insert_non_full(self.root, key, value);
        self.len += 1;

        Ok(None)
    }

    /// Count the nodes an insert of `key` will allocate.
    ///
    /// Each full node on the search path is split once (one new sibling),
    /// and a full root also needs a new root above it.
    fn nodes_needed_for(&self, key: &K) -> usize {
        let max_keys = self.config.max_keys();
        let mut needed = 0;
        let mut id = self.root;

        if self.arena[id].is_full(max_keys) {
            needed += 1;
        }
        loop {
            let node = &self.arena[id];
            if node.is_full(max_keys) {
                needed += 1;
            }
            if node.is_leaf() {
                return needed;
            }
            let (Ok(index) | Err(index)) = node.find(key);
            id = node.children[index];
        }
    }

    /// Put a new empty root above the full old root and split the old root.
    fn grow_root(&mut self) {
        let old_root = self.root;
        let new_root = self
            .arena
            .alloc(Node::with_only_child(self.config.max_keys(), old_root));
        self.root = new_root;
        self.split_child(new_root, 0);

        TreeStats::bump(&self.stats.root_splits);
        debug!(old_root = %old_root, new_root = %new_root, "root split, tree grew");
    }

    /// Split the full child at `index` of `parent`.
    ///
    /// The child's median moves up into `parent` at `index`; its upper half
    /// becomes a new node at `index + 1`.
    pub(crate) fn split_child(&mut self, parent: NodeId, index: usize) {
        let child = self.arena[parent].children[index];
        let (key, value, sibling) = self.arena[child].split();
        let sibling = self.arena.alloc(sibling);
        self.arena[parent].insert_separator(index, key, value, sibling);

        TreeStats::bump(&self.stats.splits);
        trace!(parent = %parent, left = %child, right = %sibling, "split node");
    }

    /// Insert into the subtree rooted at the non-full node `id`.
    fn insert_non_full(&mut self, mut id: NodeId, key: K, value: V) {
        let max_keys = self.config.max_keys();
        loop {
            let node = &self.arena[id];
            let (Ok(mut index) | Err(mut index)) = node.find(&key);

            if node.is_leaf() {
                self.arena[id].insert_entry(index, key, value);
                return;
            }

            let child = node.children[index];
            if self.arena[child].is_full(max_keys) {
                self.split_child(id, index);
                if key > self.arena[id].keys[index] {
                    index += 1;
                }
            }
            id = self.arena[id].children[index];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::TreeConfig;

    fn keys<K: Copy, V>(tree: &BTree<K, V>) -> Vec<K> {
        tree.traverse().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_insert_into_empty() {
        let mut tree = BTree::with_order(4).unwrap();
        assert_eq!(tree.insert(1, "one"), Ok(None));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.search(&1), Ok(&"one"));
    }

    #[test]
    fn test_full_root_splits_before_descent() {
        let mut tree = BTree::with_order(4).unwrap();
        for k in [10, 20, 5] {
            tree.insert(k, ()).unwrap();
        }
        assert_eq!(tree.height(), 1);

        tree.insert(6, ()).unwrap();

        assert_eq!(tree.height(), 2);
        let root = tree.node(tree.root_id());
        assert_eq!(root.keys(), &[10]);
        let left = tree.node(root.children()[0]);
        let right = tree.node(root.children()[1]);
        assert_eq!(left.keys(), &[5, 6]);
        assert_eq!(right.keys(), &[20]);
        assert_eq!(tree.stats().snapshot().root_splits, 1);
    }

    #[test]
    fn test_reject_duplicate_leaves_tree_untouched() {
        let mut tree = BTree::with_order(4).unwrap();
        tree.insert(1, "first").unwrap();

        assert_eq!(tree.insert(1, "second"), Err(Error::DuplicateKey));
        assert_eq!(tree.search(&1), Ok(&"first"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_overwrite_duplicate_returns_old_value() {
        let config = TreeConfig::default().duplicates(DuplicatePolicy::Overwrite);
        let mut tree = BTree::new(config).unwrap();
        tree.insert(1, "first").unwrap();

        assert_eq!(tree.insert(1, "second"), Ok(Some("first")));
        assert_eq!(tree.search(&1), Ok(&"second"));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_string_keys_are_owned() {
        let mut tree = BTree::with_order(4).unwrap();
        let mut name = String::from("paracetamol");
        tree.insert(name.clone(), 1).unwrap();
        name.push_str("-extra");

        assert_eq!(tree.search("paracetamol"), Ok(&1));
        assert!(!tree.contains_key("paracetamol-extra"));
    }

    #[test]
    fn test_ascending_and_descending_runs() {
        let mut tree = BTree::with_order(4).unwrap();
        for k in 0..200 {
            tree.insert(k, k).unwrap();
        }
        for k in (200..400).rev() {
            tree.insert(k, k).unwrap();
        }
        assert_eq!(keys(&tree), (0..400).collect::<Vec<_>>());
        tree.check_invariants().unwrap();
    }

    #[test]
    fn test_node_budget_failure_is_atomic() {
        // Root leaf plus two leaves under a new root uses exactly 3 nodes.
        let config = TreeConfig::default().max_nodes(3);
        let mut tree = BTree::new(config).unwrap();
        for k in [10, 20, 30, 40, 50] {
            tree.insert(k, ()).unwrap();
        }
        assert_eq!(tree.node_count(), 3);
        let before = keys(&tree);

        // The right leaf [30, 40, 50] is full, so inserting 60 needs a fourth node.
        assert_eq!(
            tree.insert(60, ()),
            Err(Error::AllocationFailure {
                requested: 1,
                live: 3
            })
        );
        assert_eq!(keys(&tree), before);
        assert_eq!(tree.len(), 5);
        tree.check_invariants().unwrap();

        // Inserting into the leaf that still has room needs nothing new.
        tree.insert(15, ()).unwrap();
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_nodes_needed_counts_root_twice() {
        let mut tree = BTree::with_order(4).unwrap();
        for k in [1, 2, 3] {
            tree.insert(k, ()).unwrap();
        }
        assert_eq!(tree.nodes_needed_for(&4), 2);
    }
}
