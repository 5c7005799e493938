//! B-tree index engine.
//!
//! A generic, in-memory B-tree of even order (default 4) with:
//! - Search by key (or any borrowed form of it)
//! - Insert with preemptive top-down splitting
//! - Delete with top-down borrow/merge rebalancing
//! - Lazy in-order traversal
//!
//! # Components
//! - [`BTree`] - The tree handle
//! - [`Node`] - A node: sorted entries plus child ids
//! - [`Iter`] - In-order traversal
//! - [`TreeStats`] - Operation counters
//! - [`InvariantViolation`] - Report from [`BTree::check_invariants`]

mod arena;
mod delete;
mod insert;
mod iter;
mod node;
mod stats;
mod tree;
mod validate;

pub use iter::Iter;
pub use node::Node;
pub use stats::{StatsSnapshot, TreeStats};
pub use tree::BTree;
pub use validate::InvariantViolation;
