//! # AF Operations - Fund Transfer Validation
//!
//! **Status:** Production-Ready
//!
//! ## Purpose
//!
//! Validates and records fund-transfer operations for humanitarian aid plans.
//! Every operation moves an amount for one (plan, beneficiary) scope through
//! one of three stages: donation, approval or settlement. An operation is
//! written to the ledger only if it conserves flow against everything already
//! recorded for its scope.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Donated sum never exceeds the needed price | `domain/transition.rs` - `evaluate_transition()` |
//! | Each donation is at least the minimum price | `domain/transition.rs` - `evaluate_transition()` |
//! | Approved sum per source never exceeds min(needed, donated) | `domain/transition.rs` - `evaluate_transition()` |
//! | Settled sums never exceed approved, or donated to the target | `domain/transition.rs` - `evaluate_transition()` |
//! | Operations are append-only | `adapters/memory_ledger.rs` - `put()` |
//! | Nothing read during evaluation changed before commit | `adapters/memory_ledger.rs` - read-set check |
//!
//! ## Stage Codes
//!
//! | Stage | Code | Target org | Donor identifier |
//! |-------|------|------------|------------------|
//! | Donated | `001` | required | required, checksum-valid |
//! | Approved | `002` | ignored | ignored |
//! | Settled | `003` | required | ignored |
//!
//! ## Outcome Model
//!
//! A submission returns `Ok(Accepted)`, `Ok(Rejected(code))` or
//! `Err(ServiceFault)`. Rejections are business outcomes from the error
//! catalog; only ledger and identity failures are faults.
//!
//! ## Usage Example
//!
//! ```ignore
//! use af_operations::prelude::*;
//!
//! let service = OperationService::new(
//!     Arc::new(InMemoryLedger::new()),
//!     StaticIdentity::new("Org1MSP"),
//!     UuidTrackingIds,
//!     SystemTimeSource,
//!     ServiceConfig::default(),
//! );
//!
//! match service.create_operation(request).await? {
//!     OperationOutcome::Accepted(op) => println!("recorded {}", op.tracking_id()),
//!     OperationOutcome::Rejected(err) => println!("refused: {}", err.code()),
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Beneficiary, Operation, OperationRequest, OperationScope, PlanAllocation, Stage,
        StageTotals, ThresholdRecord, Thresholds, ValidatedRequest,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        Amount, BeneficiaryId, DonorIdentifier, OrgId, PlanId, Timestamp, TrackingId,
    };

    // Ledger model
    pub use crate::domain::ledger::{
        EntityKind, LedgerEntity, LedgerKey, LedgerRecord, PendingWrite, ReadSet, Version,
    };
    pub use crate::domain::predicate::{Field, Predicate};

    // Domain logic
    pub use crate::domain::transition::{evaluate_transition, StageAggregates};
    pub use crate::domain::validation::{
        is_valid_national_id, validate_request, STALENESS_TOLERANCE_MS,
    };

    // Ports
    pub use crate::ports::inbound::{OperationApi, OperationOutcome, Verdict};
    pub use crate::ports::outbound::{
        IdentityProvider, LedgerReader, LedgerWriter, SystemTimeSource, TimeSource,
        TrackingIdGenerator,
    };

    // Adapters
    pub use crate::adapters::{
        FixedTimeSource, InMemoryLedger, LedgerSnapshot, SequentialTrackingIds, StaticIdentity,
        UuidTrackingIds,
    };

    // Service
    pub use crate::service::{OperationService, ServiceConfig};

    // Errors
    pub use crate::errors::{
        ApprovementError, CommonError, IdentityError, LedgerError, OperationError, PaymentError,
        ServiceFault, SettlementError,
    };
}

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
