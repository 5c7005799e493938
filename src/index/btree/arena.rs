//! Node arena - owning storage for a tree's nodes.
//!
//! Every node lives in exactly one slot. Parents refer to children by
//! [`NodeId`], so there is no shared or aliased ownership between nodes or
//! between trees: each [`BTree`](super::BTree) owns its own arena.
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    NodeArena                     │
//! │  slots:     [Some(n0)] [None] [Some(n2)] ...     │
//! │  free_list: [Node(1)]  (vacated slots, LIFO)     │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Allocation is split in two: [`NodeArena::reserve`] performs every fallible
//! check up front, and [`NodeArena::alloc`] then cannot fail. The tree
//! reserves all nodes an insert will need before it modifies anything.

use std::ops::{Index, IndexMut};

use crate::common::{Error, NodeId, Result};

use super::node::Node;

/// Slot storage for the nodes of one tree.
pub(crate) struct NodeArena<K, V> {
    /// Node slots; `None` marks a freed slot.
    slots: Vec<Option<Node<K, V>>>,

    /// Stack of vacated slots, reused before the vector grows.
    free_list: Vec<NodeId>,

    /// Number of occupied slots.
    live: usize,

    /// Optional cap on `live`.
    max_nodes: Option<usize>,
}

impl<K, V> NodeArena<K, V> {
    /// Create an empty arena.
    pub fn new(max_nodes: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            max_nodes,
        }
    }

    /// Make sure the next `additional` calls to [`alloc`](Self::alloc) succeed.
    ///
    /// # Errors
    /// - `Error::AllocationFailure` if the node budget would be exceeded or
    ///   the slot vector cannot grow
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let failure = || Error::AllocationFailure {
            requested: additional,
            live: self.live,
        };

        if let Some(limit) = self.max_nodes {
            if self.live + additional > limit {
                return Err(failure());
            }
        }

        let reusable = self.free_list.len();
        if additional > reusable {
            let needed = additional - reusable;
            let spare = self.slots.capacity() - self.slots.len();
            if needed > spare {
                self.slots.try_reserve(needed).map_err(|_| failure())?;
            }
        }

        Ok(())
    }

    /// Store `node` in a free slot and return its id.
    ///
    /// Callers must [`reserve`](Self::reserve) first so that this never
    /// reallocates.
    pub fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        self.live += 1;
        match self.free_list.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId::new(self.slots.len() - 1)
            }
        }
    }

    /// Vacate the slot of `id`, returning the node that lived there.
    ///
    /// # Panics
    /// Panics if `id` was already freed.
    pub fn free(&mut self, id: NodeId) -> Node<K, V> {
        let Some(node) = self.slots.get_mut(id.0).and_then(Option::take) else {
            panic!("double free of {id}");
        };
        self.live -= 1;
        self.free_list.push(id);
        node
    }

    /// Drop every node, keeping the slot vector's capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.live = 0;
    }

    /// Number of live nodes.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match self.slots.get(id.0) {
            Some(Some(node)) => node,
            _ => panic!("{id} is not a live node"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match self.slots.get_mut(id.0) {
            Some(Some(node)) => node,
            _ => panic!("{id} is not a live node"),
        }
    }
}
