//! Boundary trait for fetching the authoritative copy of an entity.
//!
//! Implementations perform the network round trip (see the OSM API adapter in
//! `toponym-data`); the corrector only distinguishes success, "gone" and hard
//! failure.

use thiserror::Error;

use crate::entity::{EntityKind, EntityRef, Tags};

/// Result of a successful remote lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The entity exists; these are its current tags.
    Found(Tags),
    /// The entity was deleted or never existed remotely.
    Gone,
}

/// Hard failures of a remote lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The service answered with an unexpected status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The request could not be sent.
    #[error("network error requesting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying error message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse response from {url}: {message}")]
    Parse {
        /// Requested URL.
        url: String,
        /// Parser error message.
        message: String,
    },
    /// The response did not contain the requested entity.
    #[error("response from {url} does not contain {entity}")]
    MissingElement {
        /// Requested URL.
        url: String,
        /// Entity that was requested.
        entity: EntityRef,
    },
}

/// Fetch the current tags of an entity by `(kind, id)`.
///
/// Implementations must be callable from several worker threads at once.
///
/// # Examples
///
/// ```rust
/// use toponym_core::{EntityFetcher, EntityKind, FetchError, FetchOutcome, Tags};
///
/// struct NothingExists;
///
/// impl EntityFetcher for NothingExists {
///     fn fetch(&self, _kind: EntityKind, _id: i64) -> Result<FetchOutcome, FetchError> {
///         Ok(FetchOutcome::Gone)
///     }
/// }
///
/// assert_eq!(NothingExists.fetch(EntityKind::Way, 1)?, FetchOutcome::Gone);
/// # Ok::<(), FetchError>(())
/// ```
pub trait EntityFetcher: Send + Sync {
    /// Look up the entity remotely.
    ///
    /// # Errors
    /// Returns [`FetchError`] for any failure other than "gone".
    fn fetch(&self, kind: EntityKind, id: i64) -> Result<FetchOutcome, FetchError>;
}
