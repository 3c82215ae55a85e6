//! # Driven Ports (SPI - Outbound)
//!
//! Capabilities the validator consumes. All of them are injected into
//! [`crate::service::OperationService`] so tests can supply deterministic
//! fakes.
//!
//! Ledger reads and writes are the only suspension points of an evaluation.

use crate::domain::ledger::{LedgerRecord, PendingWrite, ReadSet, Version};
use crate::domain::predicate::Predicate;
use crate::domain::value_objects::{OrgId, Timestamp, TrackingId};
use crate::errors::{IdentityError, LedgerError};
use async_trait::async_trait;

// =============================================================================
// LEDGER
// =============================================================================

/// Equality-predicate queries over the shared ledger.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Returns every record matching `predicate`, ordered by key.
    async fn query(&self, predicate: &Predicate) -> Result<Vec<LedgerRecord>, LedgerError>;
}

/// Append-only writes to the shared ledger.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Persists a new record.
    ///
    /// Implementations must refuse the write with
    /// [`LedgerError::ReadSetConflict`] if re-running any predicate in
    /// `read_set` yields a different key/version set, and with
    /// [`LedgerError::KeyExists`] if the key is taken.
    async fn put(&self, write: PendingWrite, read_set: &ReadSet) -> Result<Version, LedgerError>;
}

// =============================================================================
// IDENTITY, IDS, TIME
// =============================================================================

/// Resolves the organization credential of the submitting caller.
pub trait IdentityProvider: Send + Sync {
    /// Organization of the current caller.
    fn caller_identity(&self) -> Result<OrgId, IdentityError>;
}

/// Source of unique tracking identifiers.
pub trait TrackingIdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn next_id(&self) -> TrackingId;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}
