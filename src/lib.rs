//! medindex - An order-4 B-tree index engine for an in-memory record set.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            medindex                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Catalog (catalog/)                       │   │
//! │  │   medications by id · names · batch expiries · suppliers │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Indexes (index/)                         │   │
//! │  │        BTree<K, V>  (unique)   MultiIndex<K, R>  (bag)   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Engine (index/btree/)                    │   │
//! │  │   NodeArena + Node + split/borrow/merge + TreeStats      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, Error, config)
//! - [`index`] - The generic B-tree and the secondary multi-index
//! - [`catalog`] - The medication and supplier indexes
//!
//! # Quick Start
//! ```
//! use medindex::{BTree, Error, TreeConfig};
//!
//! let mut tree = BTree::new(TreeConfig::default()).unwrap();
//! for key in [10, 20, 5, 6, 12, 30, 7, 17] {
//!     tree.insert(key, key * 100).unwrap();
//! }
//!
//! assert_eq!(tree.search(&12), Ok(&1200));
//! assert_eq!(tree.insert(12, 0), Err(Error::DuplicateKey));
//!
//! tree.delete(&6).unwrap();
//! let keys: Vec<i32> = tree.traverse().map(|(k, _)| *k).collect();
//! assert_eq!(keys, vec![5, 7, 10, 12, 17, 20, 30]);
//! ```

pub mod catalog;
pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_ORDER, MIN_ORDER};
pub use common::{DuplicatePolicy, Error, NodeId, Result, TreeConfig};

pub use catalog::{Catalog, MedicationId, MedicationKeys, MedicationRef, SupplierId, SupplierRef};
pub use index::btree::{InvariantViolation, Iter, Node, StatsSnapshot, TreeStats};
pub use index::{BTree, MultiIndex};
