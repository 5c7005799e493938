//! Configuration for B-tree instances.

use crate::common::{Error, Result};

/// Order used by every index unless configured otherwise.
///
/// An order-4 tree is a 2-3-4 tree:
/// - At most 4 children and 3 keys per node
/// - Minimum degree `t = 2`, so every non-root node holds at least 1 key
pub const DEFAULT_ORDER: usize = 4;

/// Smallest order accepted by [`TreeConfig::validate`].
///
/// Orders below 3 leave the minimum degree undefined. Odd orders (3 included)
/// are also rejected: splitting a full node of `order - 1` keys, or merging two
/// minimal siblings around their separator, only respects the `t - 1` key
/// minimum when `order` is even.
pub const MIN_ORDER: usize = 4;

/// What `insert` does when the key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail with [`Error::DuplicateKey`] and leave the tree untouched.
    #[default]
    Reject,

    /// Replace the stored value and hand the old one back.
    Overwrite,
}

/// Configuration for a single tree instance.
///
/// # Example
/// ```
/// use medindex::common::{DuplicatePolicy, TreeConfig};
///
/// let config = TreeConfig::new(6)
///     .duplicates(DuplicatePolicy::Overwrite)
///     .max_nodes(128);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_keys(), 5);
/// assert_eq!(config.min_degree(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum number of children per internal node.
    pub order: usize,

    /// Policy applied when inserting an existing key.
    pub duplicates: DuplicatePolicy,

    /// Upper bound on live nodes, or `None` for no bound beyond the allocator.
    pub max_nodes: Option<usize>,
}

impl TreeConfig {
    /// Create a config with the given order, rejecting duplicates, unbounded.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            duplicates: DuplicatePolicy::Reject,
            max_nodes: None,
        }
    }

    /// Set the duplicate-key policy.
    pub fn duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Cap the number of live nodes.
    pub fn max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Maximum keys per node (`order - 1`).
    #[inline]
    pub fn max_keys(&self) -> usize {
        self.order - 1
    }

    /// Minimum degree `t = ceil(order / 2)`.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.order.div_ceil(2)
    }

    /// Minimum keys for a non-root node (`t - 1`).
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.min_degree() - 1
    }

    /// Check that the config describes a tree the engine can maintain.
    ///
    /// # Errors
    /// - `Error::InvalidConfiguration` if the order is below [`MIN_ORDER`] or odd,
    ///   or if `max_nodes` is zero
    pub fn validate(&self) -> Result<()> {
        if self.order < 3 {
            return Err(Error::InvalidConfiguration(format!(
                "order {} leaves the minimum degree undefined",
                self.order
            )));
        }
        if self.order < MIN_ORDER || self.order % 2 != 0 {
            return Err(Error::InvalidConfiguration(format!(
                "order {} must be even and at least {}",
                self.order, MIN_ORDER
            )));
        }
        if self.max_nodes == Some(0) {
            return Err(Error::InvalidConfiguration(
                "max_nodes must leave room for the root".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}
