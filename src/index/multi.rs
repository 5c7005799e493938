//! Secondary index: one key, many record references.
//!
//! Secondary attributes such as a medication name or a batch expiry date are
//! not unique: two batches may expire on the same day. A [`MultiIndex`]
//! stores, per distinct key, every reference filed under it, so no collision
//! is ever dropped or overwritten.

use std::borrow::Borrow;

use crate::common::{DuplicatePolicy, Error, Result, TreeConfig};
use crate::index::btree::{BTree, TreeStats};

/// A B-tree from keys to lists of references.
///
/// Each `insert` files one entry. The same reference may be filed twice
/// under a key (one medication, two batches expiring the same day); each
/// `remove` takes back one entry. References under a key keep their
/// insertion order.
///
/// # Example
/// ```
/// use medindex::{MultiIndex, TreeConfig};
///
/// let mut expiries = MultiIndex::new(TreeConfig::default()).unwrap();
/// expiries.insert("2025-03-31".to_string(), 7).unwrap();
/// expiries.insert("2025-03-31".to_string(), 9).unwrap();
///
/// assert_eq!(expiries.get("2025-03-31"), &[7, 9]);
/// assert_eq!(expiries.len(), 1);
/// assert_eq!(expiries.ref_count(), 2);
/// ```
pub struct MultiIndex<K, R> {
    tree: BTree<K, Vec<R>>,
    refs: usize,
}

impl<K: Ord, R: PartialEq> MultiIndex<K, R> {
    /// Create an empty index.
    ///
    /// The duplicate policy of `config` is irrelevant here: a repeated key
    /// extends its reference list instead of reaching the tree.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if `config` fails validation
    pub fn new(config: TreeConfig) -> Result<Self> {
        let config = config.duplicates(DuplicatePolicy::Reject);
        Ok(Self {
            tree: BTree::new(config)?,
            refs: 0,
        })
    }

    /// File `reference` under `key`.
    ///
    /// # Errors
    /// - `Error::AllocationFailure` if a new key needs nodes that cannot be
    ///   allocated
    pub fn insert(&mut self, key: K, reference: R) -> Result<()> {
        if let Ok(list) = self.tree.search_mut(&key) {
            list.push(reference);
            self.refs += 1;
            return Ok(());
        }

        self.tree.insert(key, vec![reference])?;
        self.refs += 1;
        Ok(())
    }

    /// Take one `reference` entry back from under `key`, dropping the key
    /// once nothing is filed under it.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent or does not hold `reference`
    pub fn remove<Q>(&mut self, key: &Q, reference: &R) -> Result<()>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let list = self.tree.search_mut(key)?;
        let position = list
            .iter()
            .position(|r| r == reference)
            .ok_or(Error::NotFound)?;
        list.remove(position);
        let now_empty = list.is_empty();
        self.refs -= 1;

        if now_empty {
            self.tree.delete(key)?;
        }
        Ok(())
    }

    /// Remove `key` and every reference under it.
    ///
    /// # Errors
    /// - `Error::NotFound` if the key is absent
    pub fn remove_all<Q>(&mut self, key: &Q) -> Result<Vec<R>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let list = self.tree.delete(key)?;
        self.refs -= list.len();
        Ok(list)
    }

    /// References filed under `key`; empty if the key is absent.
    pub fn get<Q>(&self, key: &Q) -> &[R]
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.search(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `key` holds at least one reference.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains_key(key)
    }
}

impl<K, R> MultiIndex<K, R> {
    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Total number of filed references across all keys.
    pub fn ref_count(&self) -> usize {
        self.refs
    }

    /// Walk `(key, reference)` pairs in key order.
    pub fn traverse(&self) -> impl Iterator<Item = (&K, &R)> + '_ {
        self.tree
            .traverse()
            .flat_map(|(key, list)| list.iter().map(move |r| (key, r)))
    }

    /// Walk keys with all references filed under them, in key order.
    pub fn groups(&self) -> impl Iterator<Item = (&K, &[R])> + '_ {
        self.tree.traverse().map(|(key, list)| (key, list.as_slice()))
    }

    /// The underlying tree.
    pub fn tree(&self) -> &BTree<K, Vec<R>> {
        &self.tree
    }

    /// Operation counters of the underlying tree.
    pub fn stats(&self) -> &TreeStats {
        self.tree.stats()
    }
}
