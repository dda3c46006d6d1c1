//! Error types for the boundcache library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by cache and counter operations. Construction
//!   rejects bad parameters with [`CacheError::InvalidArgument`]; lookups and
//!   removals of absent keys fail with [`CacheError::KeyNotFound`].
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use boundcache::error::CacheError;
//! use boundcache::policy::lri::LriCache;
//!
//! // Zero capacity is rejected without panicking
//! let bad = LriCache::<String, i32>::new(0);
//! assert!(matches!(bad, Err(CacheError::InvalidArgument(_))));
//!
//! // Absent keys surface as KeyNotFound
//! let cache: LriCache<String, i32> = LriCache::new(4).unwrap();
//! assert_eq!(cache.get(&"missing".to_string()), Err(CacheError::KeyNotFound));
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by cache, counter and recency-list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// A construction parameter was out of range (e.g. `max_size == 0`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested key is not tracked.
    #[error("key not found")]
    KeyNotFound,
}

impl CacheError {
    /// Creates an [`CacheError::InvalidArgument`] with the given description.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Returns `true` for [`CacheError::KeyNotFound`].
    #[inline]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound)
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods on
/// [`RecencyList`](crate::ds::RecencyList) and
/// [`BoundedCache`](crate::policy::bounded::BoundedCache).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
