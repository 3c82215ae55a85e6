//! # Error Types
//!
//! Two families live here and must not be confused:
//!
//! - **Rejections** ([`OperationError`] and its groups) are business outcomes.
//!   They are returned as values inside [`crate::ports::OperationOutcome`] and
//!   never abort the caller.
//! - **Faults** ([`ServiceFault`]) mean the ledger or the identity provider
//!   could not serve the request. Nothing has been written when one surfaces.

use crate::domain::ledger::LedgerKey;
use crate::domain::value_objects::{Amount, Timestamp};
use thiserror::Error;

// =============================================================================
// COMMON REJECTIONS
// =============================================================================

/// Rejections shared by every stage: input shape and reference data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// A required field was empty or zero.
    #[error("missing required field: {field}")]
    MissingField {
        /// Wire name of the missing field.
        field: &'static str,
    },

    /// Target organization is required for donations and settlements.
    #[error("target organization is required for this stage")]
    MissingTargetOrg,

    /// Donations must name the donor.
    #[error("donor identifier is required for donations")]
    MissingDonorIdentifier,

    /// Donor identifier failed the check-digit validation.
    #[error("donor identifier failed checksum validation")]
    InvalidDonorChecksum,

    /// The request timestamp is older than the tolerance window.
    #[error("stale timestamp: {occurred_at} is older than {tolerance_ms}ms before {now}")]
    StaleTimestamp {
        /// Caller-supplied timestamp.
        occurred_at: Timestamp,
        /// Processing time.
        now: Timestamp,
        /// Tolerance window applied.
        tolerance_ms: u64,
    },

    /// Stage code is not one of `001`, `002`, `003`.
    #[error("unknown stage code: {0:?}")]
    UnknownStage(String),

    /// No beneficiary record exists.
    #[error("beneficiary not found")]
    BeneficiaryNotFound,

    /// Beneficiary exists but is not allocated to the plan.
    #[error("beneficiary is not allocated to the plan")]
    BeneficiaryNotAllocated,

    /// No min/needed price record exists for the plan and beneficiary.
    #[error("threshold record not found for plan and beneficiary")]
    ThresholdNotFound,
}

// =============================================================================
// STAGE REJECTIONS
// =============================================================================

/// Rejections for donations (stage `001`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Single donation below the plan minimum.
    #[error("donation {amount} is below the minimum {minimum}")]
    BelowMinimum {
        /// Requested amount.
        amount: Amount,
        /// Minimum accepted donation.
        minimum: Amount,
    },

    /// Donations would exceed what the beneficiary needs.
    #[error("donations would reach {total}, above the needed price {needed}")]
    ExceedsNeededPrice {
        /// Existing donations plus the request.
        total: Amount,
        /// Needed price for the scope.
        needed: Amount,
    },
}

/// Rejections for approvals (stage `002`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApprovementError {
    /// Approvals would exceed the needed price.
    #[error("approvals would reach {total}, above the needed price {needed}")]
    ExceedsNeededPrice {
        /// Existing approvals plus the request.
        total: Amount,
        /// Needed price for the scope.
        needed: Amount,
    },

    /// Approvals would exceed what was donated.
    #[error("approvals would reach {total}, above the donated total {donated}")]
    ExceedsDonated {
        /// Existing approvals plus the request.
        total: Amount,
        /// Donated total for the scope.
        donated: Amount,
    },
}

/// Rejections for settlements (stage `003`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    /// Settlements would exceed the approved total.
    #[error("settlements would reach {total}, above the approved total {approved}")]
    ExceedsApproved {
        /// Existing settlements plus the request.
        total: Amount,
        /// Approved total for the source organization.
        approved: Amount,
    },

    /// Settlements to the target would exceed what it recorded as donated.
    #[error("settlements to target would reach {total}, above its donated total {donated}")]
    ExceedsDonated {
        /// Existing settlements to the target plus the request.
        total: Amount,
        /// Donated total recorded for the organization pair.
        donated: Amount,
    },
}

/// Any rejection from the fixed catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// Shape, time or reference-data rejection.
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Donation threshold rejection.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Approval threshold rejection.
    #[error(transparent)]
    Approvement(#[from] ApprovementError),

    /// Settlement threshold rejection.
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

impl OperationError {
    /// Stable symbolic code, `Group.Variant`.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Common(err) => match err {
                CommonError::MissingField { .. } => "Common.MissingField",
                CommonError::MissingTargetOrg => "Common.MissingTargetOrg",
                CommonError::MissingDonorIdentifier => "Common.MissingDonorIdentifier",
                CommonError::InvalidDonorChecksum => "Common.InvalidDonorChecksum",
                CommonError::StaleTimestamp { .. } => "Common.StaleTimestamp",
                CommonError::UnknownStage(_) => "Common.UnknownStage",
                CommonError::BeneficiaryNotFound => "Common.BeneficiaryNotFound",
                CommonError::BeneficiaryNotAllocated => "Common.BeneficiaryNotAllocated",
                CommonError::ThresholdNotFound => "Common.ThresholdNotFound",
            },
            Self::Payment(err) => match err {
                PaymentError::BelowMinimum { .. } => "Payment.BelowMinimum",
                PaymentError::ExceedsNeededPrice { .. } => "Payment.ExceedsNeededPrice",
            },
            Self::Approvement(err) => match err {
                ApprovementError::ExceedsNeededPrice { .. } => "Approvement.ExceedsNeededPrice",
                ApprovementError::ExceedsDonated { .. } => "Approvement.ExceedsDonated",
            },
            Self::Settlement(err) => match err {
                SettlementError::ExceedsApproved { .. } => "Settlement.ExceedsApproved",
                SettlementError::ExceedsDonated { .. } => "Settlement.ExceedsDonated",
            },
        }
    }
}

// =============================================================================
// FAULTS
// =============================================================================

/// Errors raised by the ledger collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Ledger could not be reached.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    /// A record observed during validation changed before commit.
    #[error("read set conflict: query over {kind} matched a different record set at commit")]
    ReadSetConflict {
        /// Entity kind of the conflicting query.
        kind: &'static str,
    },

    /// The ledger is append-only; the key is already taken.
    #[error("key already exists: {0}")]
    KeyExists(LedgerKey),

    /// A stored document could not be decoded into its entity.
    #[error("corrupted record {key}: {reason}")]
    Corrupted {
        /// Key of the offending record.
        key: LedgerKey,
        /// Decoder message.
        reason: String,
    },

    /// An entity could not be encoded for storage.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LedgerError {
    /// Returns true if resubmitting the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::ReadSetConflict { .. })
    }
}

/// Errors raised while resolving the caller's organization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The caller presented no organization credential.
    #[error("caller identity could not be resolved")]
    Unresolved,

    /// The identity provider failed.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Fatal condition reported to the caller instead of an outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceFault {
    /// Ledger read or write failed.
    #[error("ledger fault: {0}")]
    Ledger(#[from] LedgerError),

    /// Caller identity could not be resolved.
    #[error("identity fault: {0}")]
    Identity(#[from] IdentityError),
}

impl ServiceFault {
    /// Returns true if resubmitting the same request may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Identity(_) => false,
        }
    }
}

/// Short-circuit of an evaluation pipeline: either a rejection or a fault.
///
/// Lets every pipeline step use `?` regardless of which family it raises.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Request rejected with a catalog error.
    #[error("rejected: {0}")]
    Rejected(OperationError),

    /// Collaborator fault.
    #[error(transparent)]
    Fault(ServiceFault),
}

impl From<OperationError> for EvaluationError {
    fn from(err: OperationError) -> Self {
        Self::Rejected(err)
    }
}

impl From<CommonError> for EvaluationError {
    fn from(err: CommonError) -> Self {
        Self::Rejected(err.into())
    }
}

impl From<ServiceFault> for EvaluationError {
    fn from(err: ServiceFault) -> Self {
        Self::Fault(err)
    }
}

impl From<LedgerError> for EvaluationError {
    fn from(err: LedgerError) -> Self {
        Self::Fault(err.into())
    }
}

// =============================================================================
// TESTS
// =============================================================================
