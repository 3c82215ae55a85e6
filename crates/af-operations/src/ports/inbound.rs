//! # Driving Ports (API - Inbound)
//!
//! The interface exposed to the layer that submits ledger transactions.
//!
//! Every submission yields exactly one of: an accepted [`Operation`], a
//! rejection from the error catalog, or a [`ServiceFault`]. Rejections and
//! faults never leave a partial write behind.

use crate::domain::entities::{Operation, OperationRequest, StageTotals};
use crate::domain::value_objects::{BeneficiaryId, PlanId};
use crate::errors::{OperationError, ServiceFault};
use async_trait::async_trait;

/// Result of a submission that reached a decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The operation was recorded.
    Accepted(Operation),
    /// The operation was refused; nothing was written.
    Rejected(OperationError),
}

impl OperationOutcome {
    /// Returns true for an accepted operation.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// The recorded operation, if accepted.
    #[must_use]
    pub fn operation(&self) -> Option<&Operation> {
        match self {
            Self::Accepted(op) => Some(op),
            Self::Rejected(_) => None,
        }
    }

    /// The rejection, if refused.
    #[must_use]
    pub fn rejection(&self) -> Option<&OperationError> {
        match self {
            Self::Accepted(_) => None,
            Self::Rejected(err) => Some(err),
        }
    }
}

/// Decision of a dry-run validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every check passed against the current ledger.
    Accept,
    /// The request would be refused.
    Reject(OperationError),
}

/// Primary API of the operations subsystem.
///
/// ## Usage
///
/// ```ignore
/// match api.create_operation(request).await? {
///     OperationOutcome::Accepted(op) => println!("recorded {}", op.tracking_id()),
///     OperationOutcome::Rejected(err) => println!("refused: {}", err.code()),
/// }
/// ```
#[async_trait]
pub trait OperationApi: Send + Sync {
    /// Validates a request and, if every check passes, records it.
    async fn create_operation(
        &self,
        request: OperationRequest,
    ) -> Result<OperationOutcome, ServiceFault>;

    /// Runs every check without writing.
    async fn check_operation(&self, request: &OperationRequest) -> Result<Verdict, ServiceFault>;

    /// Donated, approved and settled sums for a (plan, beneficiary) scope.
    async fn scope_totals(
        &self,
        plan_id: &PlanId,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<StageTotals, ServiceFault>;

    /// Operations recorded for a (plan, beneficiary) scope, oldest first.
    async fn history(
        &self,
        plan_id: &PlanId,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<Vec<Operation>, ServiceFault>;
}
