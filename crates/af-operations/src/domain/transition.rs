//! Transition engine: per-stage flow-conservation inequalities.
//!
//! Operations are immutable, so there is no transition *from* a record.
//! A new record is classified into a stage bucket and accepted only if the
//! stage's inequalities hold against the current aggregates.
//!
//! | Stage | Rejects when | Error |
//! |-------|--------------|-------|
//! | Donated | `amount < min` | `Payment.BelowMinimum` |
//! | Donated | `amount + D > needed` | `Payment.ExceedsNeededPrice` |
//! | Approved | `amount + A > needed` | `Approvement.ExceedsNeededPrice` |
//! | Approved | `amount + A > D` | `Approvement.ExceedsDonated` |
//! | Settled | `amount + S_src > A_all` | `Settlement.ExceedsApproved` |
//! | Settled | `amount + S_target > A_all` | `Settlement.ExceedsApproved` |
//! | Settled | `amount + S_target > D_target` | `Settlement.ExceedsDonated` |
//!
//! Checks run top to bottom; the first failing row wins.

use crate::domain::entities::{Stage, Thresholds};
use crate::domain::value_objects::Amount;
use crate::errors::{ApprovementError, OperationError, PaymentError, SettlementError};

/// Historical sums a stage's inequalities are evaluated against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageAggregates {
    /// Inputs for a donation.
    Donated {
        /// Donated sum for (plan, beneficiary).
        donated: Amount,
    },
    /// Inputs for an approval.
    Approved {
        /// Approved sum for (plan, beneficiary, source).
        approved: Amount,
        /// Donated sum for (plan, beneficiary).
        donated: Amount,
    },
    /// Inputs for a settlement.
    Settled {
        /// Approved sum for (plan, beneficiary, source).
        approved: Amount,
        /// Settled sum for (plan, beneficiary, source).
        settled_by_source: Amount,
        /// Settled sum for (plan, beneficiary, source, target).
        settled_to_target: Amount,
        /// Donated sum for (plan, beneficiary, source, target).
        donated_to_target: Amount,
    },
}

impl StageAggregates {
    /// Stage these aggregates belong to.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::Donated { .. } => Stage::Donated,
            Self::Approved { .. } => Stage::Approved,
            Self::Settled { .. } => Stage::Settled,
        }
    }
}

/// Evaluates the inequalities of the aggregates' stage for `amount`.
pub fn evaluate_transition(
    amount: Amount,
    thresholds: &Thresholds,
    aggregates: &StageAggregates,
) -> Result<(), OperationError> {
    match *aggregates {
        StageAggregates::Donated { donated } => {
            if amount < thresholds.min_price {
                return Err(PaymentError::BelowMinimum {
                    amount,
                    minimum: thresholds.min_price,
                }
                .into());
            }
            let total = amount.saturating_add(donated);
            if total > thresholds.needed_price {
                return Err(PaymentError::ExceedsNeededPrice {
                    total,
                    needed: thresholds.needed_price,
                }
                .into());
            }
        }
        StageAggregates::Approved { approved, donated } => {
            let total = amount.saturating_add(approved);
            if total > thresholds.needed_price {
                return Err(ApprovementError::ExceedsNeededPrice {
                    total,
                    needed: thresholds.needed_price,
                }
                .into());
            }
            if total > donated {
                return Err(ApprovementError::ExceedsDonated { total, donated }.into());
            }
        }
        StageAggregates::Settled {
            approved,
            settled_by_source,
            settled_to_target,
            donated_to_target,
        } => {
            let source_total = amount.saturating_add(settled_by_source);
            if source_total > approved {
                return Err(SettlementError::ExceedsApproved {
                    total: source_total,
                    approved,
                }
                .into());
            }
            // Bounded by the source-wide approved sum, not a target-scoped one.
            let target_total = amount.saturating_add(settled_to_target);
            if target_total > approved {
                return Err(SettlementError::ExceedsApproved {
                    total: target_total,
                    approved,
                }
                .into());
            }
            if target_total > donated_to_target {
                return Err(SettlementError::ExceedsDonated {
                    total: target_total,
                    donated: donated_to_target,
                }
                .into());
            }
        }
    }
    Ok(())
}
