//! Error types for medindex.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors returned by the index engine.
///
/// None of these leave a tree half-modified: every check that can fail runs
/// before the first node is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Search or delete on a key (or reference) that is not present.
    #[error("key not found")]
    NotFound,

    /// Insert of a key that already exists under `DuplicatePolicy::Reject`.
    #[error("duplicate key")]
    DuplicateKey,

    /// The node arena could not supply the nodes an insert needs.
    ///
    /// Raised when the configured node budget is exhausted or the allocator
    /// refuses to grow the arena.
    #[error("cannot allocate {requested} node(s) with {live} live")]
    AllocationFailure { requested: usize, live: usize },

    /// The tree configuration was rejected at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", Error::NotFound), "key not found");
        assert_eq!(format!("{}", Error::DuplicateKey), "duplicate key");

        let err = Error::AllocationFailure {
            requested: 2,
            live: 16,
        };
        assert_eq!(format!("{}", err), "cannot allocate 2 node(s) with 16 live");

        let err = Error::InvalidConfiguration("order 2".to_string());
        assert_eq!(format!("{}", err), "invalid configuration: order 2");
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
