//! # Caller Identity, Tracking Ids and Clocks
//!
//! Small capability adapters injected into the service.

use crate::domain::value_objects::{OrgId, Timestamp, TrackingId};
use crate::errors::IdentityError;
use crate::ports::outbound::{IdentityProvider, TimeSource, TrackingIdGenerator};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Identity provider bound to one organization credential.
#[derive(Clone, Debug)]
pub struct StaticIdentity {
    org: OrgId,
}

impl StaticIdentity {
    /// Binds every call to `org`.
    pub fn new(org: impl Into<OrgId>) -> Self {
        Self { org: org.into() }
    }
}

impl IdentityProvider for StaticIdentity {
    fn caller_identity(&self) -> Result<OrgId, IdentityError> {
        if self.org.is_empty() {
            return Err(IdentityError::Unresolved);
        }
        Ok(self.org.clone())
    }
}

/// Random (v4) tracking ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidTrackingIds;

impl TrackingIdGenerator for UuidTrackingIds {
    fn next_id(&self) -> TrackingId {
        TrackingId::new(Uuid::new_v4())
    }
}

/// Deterministic tracking ids: 1, 2, 3, ... encoded as UUIDs.
#[derive(Debug, Default)]
pub struct SequentialTrackingIds {
    issued: AtomicU64,
}

impl SequentialTrackingIds {
    /// Starts the sequence at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackingIdGenerator for SequentialTrackingIds {
    fn next_id(&self) -> TrackingId {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        TrackingId::new(Uuid::from_u128(u128::from(n)))
    }
}

/// Manually driven clock.
#[derive(Debug)]
pub struct FixedTimeSource {
    time: AtomicU64,
}

impl FixedTimeSource {
    /// Clock frozen at `initial`.
    #[must_use]
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the clock.
    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}
