//! In-order traversal.

use std::iter::FusedIterator;

use crate::common::NodeId;

use super::arena::NodeArena;

/// Lazy in-order iterator over a tree's entries.
///
/// Keeps an explicit stack of `(node, next key index)` frames instead of
/// recursing, so each `next` does O(height) work at worst.
pub struct Iter<'a, K, V> {
    arena: &'a NodeArena<K, V>,
    stack: Vec<(NodeId, usize)>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(arena: &'a NodeArena<K, V>, root: NodeId, len: usize) -> Self {
        let mut iter = Self {
            arena,
            stack: Vec::new(),
            remaining: len,
        };
        iter.descend_leftmost(root);
        iter
    }

    /// Push `id` and every first child below it.
    fn descend_leftmost(&mut self, mut id: NodeId) {
        loop {
            self.stack.push((id, 0));
            match self.arena[id].children.first() {
                Some(&child) => id = child,
                None => return,
            }
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = self.arena;
        loop {
            let (id, index) = self.stack.last_mut()?;
            let node = &arena[*id];

            if *index < node.len() {
                let i = *index;
                *index += 1;
                if !node.is_leaf() {
                    self.descend_leftmost(node.children[i + 1]);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&node.keys[i], &node.values[i]));
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
