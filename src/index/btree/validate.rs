//! Structural invariant checking.
//!
//! [`BTree::check_invariants`] walks the whole tree and reports the first
//! violation it finds. Every mutating operation is expected to leave a tree
//! for which this returns `Ok(())`.

use thiserror::Error;

use crate::common::NodeId;

use super::tree::BTree;

/// A broken B-tree invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A node holds too few or too many keys.
    #[error("{node} holds {keys} keys, expected {min}..={max}")]
    KeyCount {
        node: NodeId,
        keys: usize,
        min: usize,
        max: usize,
    },

    /// Keys inside a node are not strictly increasing.
    #[error("{node} keys are not strictly increasing")]
    Unsorted { node: NodeId },

    /// A key falls outside the range its parent's separators allow.
    #[error("{node} has a key outside its separator bounds")]
    OutOfBounds { node: NodeId },

    /// Keys and values are out of step.
    #[error("{node} holds {keys} keys but {values} values")]
    ValueCount {
        node: NodeId,
        keys: usize,
        values: usize,
    },

    /// An internal node does not have `keys + 1` children.
    #[error("{node} has {children} children for {keys} keys")]
    ChildCount {
        node: NodeId,
        keys: usize,
        children: usize,
    },

    /// Leaves sit at different depths.
    #[error("leaf {node} at depth {depth}, expected {expected}")]
    UnevenLeaves {
        node: NodeId,
        depth: usize,
        expected: usize,
    },

    /// The entry count does not match what the nodes hold.
    #[error("tree reports {reported} entries but holds {actual}")]
    LenMismatch { reported: usize, actual: usize },

    /// Some live node is not reachable from the root.
    #[error("{live} live nodes but only {reachable} reachable from the root")]
    LeakedNodes { live: usize, reachable: usize },
}

/// Running totals collected during the walk.
#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    entries: usize,
    nodes: usize,
}

impl<K: Ord, V> BTree<K, V> {
    /// Verify every structural invariant of the tree.
    ///
    /// Checks, for every node: key count within bounds (the root may hold
    /// zero keys), strictly increasing keys, keys within the parent's
    /// separator bounds, `keys + 1` children for internal nodes, and equal
    /// leaf depth. Also checks that `len()` matches the stored entries and
    /// that no freed-but-unreachable node lingers in the arena.
    ///
    /// # Errors
    /// Returns the first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut walk = Walk::default();
        self.check_node(self.root, 0, None, None, &mut walk)?;

        if walk.entries != self.len {
            return Err(InvariantViolation::LenMismatch {
                reported: self.len,
                actual: walk.entries,
            });
        }
        if walk.nodes != self.arena.live() {
            return Err(InvariantViolation::LeakedNodes {
                live: self.arena.live(),
                reachable: walk.nodes,
            });
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        walk: &mut Walk,
    ) -> Result<(), InvariantViolation> {
        let node = &self.arena[id];
        let keys = node.keys();
        walk.nodes += 1;
        walk.entries += keys.len();

        let min = if id == self.root {
            0
        } else {
            self.config.min_keys()
        };
        let max = self.config.max_keys();
        if keys.len() < min || keys.len() > max {
            return Err(InvariantViolation::KeyCount {
                node: id,
                keys: keys.len(),
                min,
                max,
            });
        }
        if node.values.len() != keys.len() {
            return Err(InvariantViolation::ValueCount {
                node: id,
                keys: keys.len(),
                values: node.values.len(),
            });
        }
        if !node.is_sorted() {
            return Err(InvariantViolation::Unsorted { node: id });
        }

        let below_lower = matches!((lower, keys.first()), (Some(lo), Some(first)) if first <= lo);
        let above_upper = matches!((upper, keys.last()), (Some(hi), Some(last)) if last >= hi);
        if below_lower || above_upper {
            return Err(InvariantViolation::OutOfBounds { node: id });
        }

        if node.is_leaf() {
            return match walk.leaf_depth {
                Some(expected) if expected != depth => Err(InvariantViolation::UnevenLeaves {
                    node: id,
                    depth,
                    expected,
                }),
                Some(_) => Ok(()),
                None => {
                    walk.leaf_depth = Some(depth);
                    Ok(())
                }
            };
        }

        let children = node.children();
        if children.len() != keys.len() + 1 {
            return Err(InvariantViolation::ChildCount {
                node: id,
                keys: keys.len(),
                children: children.len(),
            });
        }

        for (i, &child) in children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { keys.get(i - 1) };
            let child_upper = if i == keys.len() { upper } else { keys.get(i) };
            self.check_node(child, depth + 1, child_lower, child_upper, walk)?;
        }
        Ok(())
    }
}
