//! # In-Memory Ledger
//!
//! Versioned, append-only document store implementing the ledger ports.
//! Used by tests and the CLI; a production deployment plugs the shared
//! ledger in behind the same traits.
//!
//! Commits validate the caller's [`ReadSet`] under the write lock: every
//! recorded predicate is re-executed and must match exactly the same keys at
//! the same versions, which also catches phantom inserts.

use crate::domain::entities::{Beneficiary, Operation, PlanAllocation, ThresholdRecord};
use crate::domain::ledger::{
    EntityKind, LedgerEntity, LedgerKey, LedgerRecord, PendingWrite, ReadSet, Version,
};
use crate::domain::predicate::Predicate;
use crate::errors::LedgerError;
use crate::ports::outbound::{LedgerReader, LedgerWriter};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
struct StoredRecord {
    kind: EntityKind,
    version: Version,
    document: Value,
}

#[derive(Debug, Default)]
struct LedgerState {
    records: BTreeMap<LedgerKey, StoredRecord>,
    last_version: Version,
}

impl LedgerState {
    fn execute(&self, predicate: &Predicate) -> Vec<LedgerRecord> {
        self.records
            .iter()
            .filter(|(_, stored)| predicate.matches(stored.kind, &stored.document))
            .map(|(key, stored)| LedgerRecord {
                key: key.clone(),
                kind: stored.kind,
                version: stored.version,
                document: stored.document.clone(),
            })
            .collect()
    }

    fn insert(&mut self, key: LedgerKey, kind: EntityKind, document: Value) -> Version {
        self.last_version += 1;
        let version = self.last_version;
        self.records.insert(
            key,
            StoredRecord {
                kind,
                version,
                document,
            },
        );
        version
    }

    fn validate(&self, read_set: &ReadSet) -> Result<(), LedgerError> {
        for observation in read_set.observations() {
            let current: BTreeMap<LedgerKey, Version> = self
                .execute(&observation.predicate)
                .into_iter()
                .map(|record| (record.key, record.version))
                .collect();
            if current != observation.matched {
                return Err(LedgerError::ReadSetConflict {
                    kind: observation.predicate.kind().as_str(),
                });
            }
        }
        Ok(())
    }
}

/// In-memory ledger for tests and local runs.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
    available: AtomicBool,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            state: RwLock::new(LedgerState::default()),
            available: AtomicBool::new(true),
        }
    }
}

impl InMemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entity without read-set validation.
    ///
    /// For provisioning reference data; operations go through
    /// [`LedgerWriter::put`].
    pub fn upsert<E: LedgerEntity>(&self, entity: &E) -> Result<Version, LedgerError> {
        let write = PendingWrite::from_entity(entity)?;
        Ok(self
            .state
            .write()
            .insert(write.key, write.kind, write.document))
    }

    /// Simulates an outage: every call fails with `Unavailable` while false.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exports every record in key order.
    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.state.read();
        LedgerSnapshot {
            records: state
                .records
                .values()
                .map(|stored| SnapshotRecord {
                    kind: stored.kind,
                    document: stored.document.clone(),
                })
                .collect(),
        }
    }

    /// Rebuilds a ledger from a snapshot. Keys are re-derived from the
    /// documents; versions restart from 1.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, LedgerError> {
        let ledger = Self::new();
        {
            let mut state = ledger.state.write();
            for record in snapshot.records {
                let key = derive_key(record.kind, &record.document)?;
                state.insert(key, record.kind, record.document);
            }
        }
        Ok(ledger)
    }

    fn ensure_available(&self) -> Result<(), LedgerError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::Unavailable("in-memory ledger offline".to_string()))
        }
    }
}

fn derive_key(kind: EntityKind, document: &Value) -> Result<LedgerKey, LedgerError> {
    fn key_of<E: LedgerEntity>(document: &Value) -> Result<LedgerKey, LedgerError> {
        let entity: E = serde_json::from_value(document.clone())
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(entity.ledger_key())
    }

    match kind {
        EntityKind::Operation => key_of::<Operation>(document),
        EntityKind::Beneficiary => key_of::<Beneficiary>(document),
        EntityKind::PlanAllocation => key_of::<PlanAllocation>(document),
        EntityKind::ThresholdRecord => key_of::<ThresholdRecord>(document),
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn query(&self, predicate: &Predicate) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.ensure_available()?;
        Ok(self.state.read().execute(predicate))
    }
}

#[async_trait]
impl LedgerWriter for InMemoryLedger {
    async fn put(&self, write: PendingWrite, read_set: &ReadSet) -> Result<Version, LedgerError> {
        self.ensure_available()?;
        let mut state = self.state.write();

        if let Err(err) = state.validate(read_set) {
            warn!(key = %write.key, error = %err, "Refusing write with stale read set");
            return Err(err);
        }
        if state.records.contains_key(&write.key) {
            return Err(LedgerError::KeyExists(write.key));
        }

        let key = write.key.clone();
        let version = state.insert(write.key, write.kind, write.document);
        debug!(key = %key, version, "Record committed");
        Ok(version)
    }
}

// =============================================================================
// SNAPSHOTS
// =============================================================================

/// Portable ledger contents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Records in key order.
    pub records: Vec<SnapshotRecord>,
}

/// One exported document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Entity kind.
    pub kind: EntityKind,
    /// JSON document.
    pub document: Value,
}

// =============================================================================
// TESTS
// =============================================================================
