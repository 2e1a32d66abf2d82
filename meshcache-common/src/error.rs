//! Error taxonomy for the cache core (spec §7).

use thiserror::Error;

/// Result alias used throughout the cache core.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors surfaced at the core's boundaries.
///
/// Propagation policy: the coalescer captures whatever the loader returned
/// and fans it out unchanged; the group converts a successful peer fetch
/// into a `ByteView` and populates the local store, and does not populate
/// on failure.
#[derive(Debug, Error, Clone)]
pub enum CacheError {
    /// Empty key, or an unknown eviction algorithm at group construction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The caller-supplied origin getter returned an error.
    #[error("origin load failed: {0}")]
    OriginFailure(String),

    /// A peer fetch failed. The group logs this and falls back to the
    /// origin getter; this variant is only surfaced to the caller when the
    /// local fallback also fails.
    #[error("peer fetch failed: {0}")]
    PeerFailure(String),

    /// `register_peers` called twice, or a nil getter at construction.
    /// Fatal at configuration time.
    #[error("registration misuse: {0}")]
    RegistrationMisuse(String),

    /// An internal mutex was poisoned by a panicking holder.
    #[error("internal lock poisoned: {0}")]
    Poisoned(String),
}

impl CacheError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CacheError::InvalidArgument(message.into())
    }

    pub fn origin_failure(message: impl Into<String>) -> Self {
        CacheError::OriginFailure(message.into())
    }

    pub fn peer_failure(message: impl Into<String>) -> Self {
        CacheError::PeerFailure(message.into())
    }

    pub fn registration_misuse(message: impl Into<String>) -> Self {
        CacheError::RegistrationMisuse(message.into())
    }
}
