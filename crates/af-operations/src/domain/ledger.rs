//! Ledger record model.
//!
//! The shared ledger stores heterogeneous JSON documents under composite keys.
//! This module defines how domain entities map onto those documents and how
//! the reads performed during validation are captured for commit-time
//! conflict detection.

use crate::domain::predicate::Predicate;
use crate::errors::LedgerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Monotonic version stamped on every ledger write.
pub type Version = u64;

// =============================================================================
// ENTITY KINDS AND KEYS
// =============================================================================

/// Kinds of entity stored in the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Operation records written by this subsystem.
    Operation,
    /// Beneficiary registry entries.
    Beneficiary,
    /// Beneficiary-to-plan allocation entries.
    PlanAllocation,
    /// Min/needed price per plan and beneficiary.
    ThresholdRecord,
}

impl EntityKind {
    /// Namespace used in composite keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::Beneficiary => "beneficiary",
            Self::PlanAllocation => "plan-allocation",
            Self::ThresholdRecord => "threshold-record",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite ledger key: `\0kind\0part\0part\0`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerKey(String);

impl LedgerKey {
    const SEPARATOR: char = '\u{0}';

    /// Builds a composite key from an entity kind and its identifying fields.
    #[must_use]
    pub fn composite(kind: EntityKind, parts: &[&str]) -> Self {
        let mut key = String::new();
        key.push(Self::SEPARATOR);
        key.push_str(kind.as_str());
        key.push(Self::SEPARATOR);
        for part in parts {
            key.push_str(part);
            key.push(Self::SEPARATOR);
        }
        Self(key)
    }

    /// Returns the raw key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readable: Vec<&str> = self
            .0
            .split(Self::SEPARATOR)
            .filter(|part| !part.is_empty())
            .collect();
        f.write_str(&readable.join("/"))
    }
}

// =============================================================================
// RECORDS
// =============================================================================

/// A stored document as returned by a ledger query.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerRecord {
    /// Storage key.
    pub key: LedgerKey,
    /// Entity kind of the document.
    pub kind: EntityKind,
    /// Version at which the document was written.
    pub version: Version,
    /// JSON document.
    pub document: Value,
}

impl LedgerRecord {
    /// Decodes the document into a typed entity.
    pub fn decode<E: LedgerEntity>(&self) -> Result<E, LedgerError> {
        serde_json::from_value(self.document.clone()).map_err(|e| LedgerError::Corrupted {
            key: self.key.clone(),
            reason: e.to_string(),
        })
    }
}

/// A document waiting to be written.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingWrite {
    /// Storage key.
    pub key: LedgerKey,
    /// Entity kind of the document.
    pub kind: EntityKind,
    /// JSON document.
    pub document: Value,
}

impl PendingWrite {
    /// Encodes an entity for storage.
    pub fn from_entity<E: LedgerEntity>(entity: &E) -> Result<Self, LedgerError> {
        let document =
            serde_json::to_value(entity).map_err(|e| LedgerError::Serialization(e.to_string()))?;
        Ok(Self {
            key: entity.ledger_key(),
            kind: E::KIND,
            document,
        })
    }
}

/// An entity that can be stored in the ledger.
pub trait LedgerEntity: Serialize + DeserializeOwned {
    /// Entity kind, used as the key namespace and query filter.
    const KIND: EntityKind;

    /// Deterministic key built from the identifying fields.
    fn ledger_key(&self) -> LedgerKey;
}

// =============================================================================
// READ SET
// =============================================================================

/// One query executed during validation and what it matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryObservation {
    /// The executed predicate.
    pub predicate: Predicate,
    /// Matched keys and the versions they were read at.
    pub matched: BTreeMap<LedgerKey, Version>,
}

/// Everything a validation read, in query order.
///
/// Handed to the writer as the commit precondition: the write must be refused
/// if re-running any recorded predicate yields a different key/version set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReadSet {
    observations: Vec<QueryObservation>,
}

impl ReadSet {
    /// Creates an empty read set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a query and its results.
    pub fn record(&mut self, predicate: Predicate, records: &[LedgerRecord]) {
        let matched = records
            .iter()
            .map(|record| (record.key.clone(), record.version))
            .collect();
        self.observations.push(QueryObservation { predicate, matched });
    }

    /// Recorded observations.
    #[must_use]
    pub fn observations(&self) -> &[QueryObservation] {
        &self.observations
    }

    /// Number of recorded queries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns true if nothing was read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Number of distinct records touched across all queries.
    #[must_use]
    pub fn touched_records(&self) -> usize {
        let mut keys: Vec<&LedgerKey> = self
            .observations
            .iter()
            .flat_map(|obs| obs.matched.keys())
            .collect();
        keys.sort();
        keys.dedup();
        keys.len()
    }
}
