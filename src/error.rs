//! Error types for the admitkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (zero capacity, zero shards, sketch width that is not a power of two).
//!
//! Runtime outcomes (a lookup miss, an erase of a non-member, an insert that
//! fails admission) are expressed as `Option`/`bool` return values, not
//! errors. The only fallible surface is construction.
//!
//! ## Example Usage
//!
//! ```
//! use admitkit::error::ConfigError;
//! use admitkit::policy::lru::LruCore;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<LruCore<u64, i32>, ConfigError> = LruCore::try_new(100);
//! assert!(cache.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad = LruCore::<u64, i32>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCore::try_new`](crate::policy::lru::LruCore::try_new) and
/// [`ShardedTinyLfu::try_new`](crate::sharded::ShardedTinyLfu). Carries a
/// human-readable description of which parameter failed validation.
///
/// # Example
///
/// ```
/// use admitkit::ds::CountMinSketch;
///
/// let err = CountMinSketch::try_new(1000, 4).unwrap_err();
/// assert!(err.to_string().contains("power of two"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_message() {
        let err = ConfigError::new("capacity must be > 0");
        assert_eq!(err.to_string(), "capacity must be > 0");
    }

    #[test]
    fn debug_includes_message() {
        let err = ConfigError::new("bad width");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad width"));
    }

    #[test]
    fn message_accessor() {
        let err = ConfigError::new("test");
        assert_eq!(err.message(), "test");
    }

    #[test]
    fn clone_and_eq() {
        let a = ConfigError::new("x");
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
