//! The B-tree handle: construction, search, and bookkeeping.
//!
//! Insertion lives in `insert.rs`, deletion in `delete.rs`, traversal in
//! `iter.rs`; they all extend the same [`BTree`] type.

use std::borrow::Borrow;
use std::fmt;

use crate::common::{Error, NodeId, Result, TreeConfig};

use super::arena::NodeArena;
use super::iter::Iter;
use super::node::Node;
use super::stats::TreeStats;

/// An in-memory B-tree mapping unique keys to values.
///
/// # Structure
/// ```text
///                 ┌────────┐
///                 │   10   │            root (NodeId)
///                 └────────┘
///              ┌─────┘    └─────┐
///         ┌────────┐       ┌────────┐
///         │  5  6  │       │ 12 20  │    leaves, all at one depth
///         └────────┘       └────────┘
/// ```
///
/// The tree owns its keys: a key is moved in by `insert` and dropped exactly
/// once, when its entry is deleted or the tree is cleared or dropped. Values
/// are stored as given; trees in this crate store small `Copy` handles to
/// records owned elsewhere.
///
/// # Example
/// ```
/// use medindex::{BTree, Error, TreeConfig};
///
/// let mut tree = BTree::new(TreeConfig::default()).unwrap();
/// tree.insert(10, "ten").unwrap();
/// tree.insert(5, "five").unwrap();
///
/// assert_eq!(tree.search(&10), Ok(&"ten"));
/// assert_eq!(tree.search(&99), Err(Error::NotFound));
///
/// let keys: Vec<_> = tree.traverse().map(|(k, _)| *k).collect();
/// assert_eq!(keys, vec![5, 10]);
/// ```
pub struct BTree<K, V> {
    pub(crate) config: TreeConfig,
    pub(crate) arena: NodeArena<K, V>,
    pub(crate) root: NodeId,
    pub(crate) len: usize,
    pub(crate) stats: TreeStats,
}

impl<K, V> BTree<K, V> {
    /// Create an empty tree whose root is a single empty leaf.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `config` fails validation
    /// - `Error::AllocationFailure` if the root cannot be allocated
    pub fn new(config: TreeConfig) -> Result<Self> {
        config.validate()?;

        let mut arena = NodeArena::new(config.max_nodes);
        arena.reserve(1)?;
        let root = arena.alloc(Node::leaf(config.max_keys()));

        Ok(Self {
            config,
            arena,
            root,
            len: 0,
            stats: TreeStats::new(),
        })
    }

    /// Create an empty tree of the given order with default settings.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if the order is rejected
    pub fn with_order(order: usize) -> Result<Self> {
        Self::new(TreeConfig::new(order))
    }

    /// Remove every entry, leaving a single empty root leaf.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = self.arena.alloc(Node::leaf(self.config.max_keys()));
        self.len = 0;
    }

    // ========================================================================
    // Public API: Info
    // ========================================================================

    /// Number of entries in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The configuration this tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Maximum children per node.
    pub fn order(&self) -> usize {
        self.config.order
    }

    /// Minimum degree `t`.
    pub fn min_degree(&self) -> usize {
        self.config.min_degree()
    }

    /// Number of levels, counting the root; a lone root leaf has height 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut node = &self.arena[self.root];
        while let Some(&first) = node.children.first() {
            node = &self.arena[first];
            height += 1;
        }
        height
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    /// Id of the current root node.
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Borrow a live node, e.g. to inspect the shape of the tree.
    ///
    /// # Panics
    /// Panics if `id` is not a live node of this tree.
    pub fn node(&self, id: NodeId) -> &Node<K, V> {
        &self.arena[id]
    }

    /// Operation counters for this tree.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Lazily walk all entries in ascending key order.
    ///
    /// Each call starts again from the root.
    pub fn traverse(&self) -> Iter<'_, K, V> {
        Iter::new(&self.arena, self.root, self.len)
    }
}

impl<K: Ord, V> BTree<K, V> {
    // ========================================================================
    // Public API: Search
    // ========================================================================

    /// Look up the value stored under `key`.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent
    pub fn search<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        TreeStats::bump(&self.stats.searches);
        let (id, index) = self.locate(key).ok_or(Error::NotFound)?;
        Ok(&self.arena[id].values[index])
    }

    /// Look up the value stored under `key` for in-place modification.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent
    pub fn search_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        TreeStats::bump(&self.stats.searches);
        let (id, index) = self.locate(key).ok_or(Error::NotFound)?;
        Ok(&mut self.arena[id].values[index])
    }

    /// Whether `key` is present.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        TreeStats::bump(&self.stats.searches);
        self.locate(key).is_some()
    }

    /// Find the node and slot holding `key`.
    pub(crate) fn locate<Q>(&self, key: &Q) -> Option<(NodeId, usize)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.root;
        loop {
            let node = &self.arena[id];
            match node.find(key) {
                Ok(index) => return Some((id, index)),
                Err(_) if node.is_leaf() => return None,
                Err(index) => id = node.children[index],
            }
        }
    }
}

impl<'a, K, V> IntoIterator for &'a BTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.traverse()).finish()
    }
}
