//! Index structures.
//!
//! - [`btree`] - The generic B-tree engine
//! - [`multi`] - Secondary indexes mapping one key to many references

pub mod btree;
pub mod multi;

pub use btree::BTree;
pub use multi::MultiIndex;
