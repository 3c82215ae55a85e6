//! Shared fixtures: a seeded reference scope and deterministic services.

use af_operations::prelude::*;
use std::sync::Arc;

/// Processing time pinned by every fixture service.
pub const NOW: Timestamp = 1_700_000_000_000;

/// Checksum-valid donor national identifier.
pub const VALID_DONOR: &str = "0013542419";

/// Plan of the seeded scope.
pub const PLAN: &str = "plan-flood-2024";

/// Beneficiary of the seeded scope.
pub const BENEFICIARY: &str = "ben-0042";

/// Minimum and needed price of the seeded scope.
pub const MIN_PRICE: u64 = 10;
/// See [`MIN_PRICE`].
pub const NEEDED_PRICE: u64 = 100;

/// Service with pinned identity, tracking ids and clock.
pub type FixtureService<L> =
    OperationService<L, StaticIdentity, SequentialTrackingIds, FixedTimeSource>;

/// Beneficiary, allocation and thresholds for (plan, beneficiary).
pub fn seed_scope(
    ledger: &InMemoryLedger,
    plan: &str,
    beneficiary: &str,
    min_price: u64,
    needed_price: u64,
) -> Result<(), LedgerError> {
    ledger.upsert(&Beneficiary {
        beneficiary_id: beneficiary.into(),
    })?;
    ledger.upsert(&PlanAllocation {
        plan_id: plan.into(),
        beneficiary_id: beneficiary.into(),
    })?;
    ledger.upsert(&ThresholdRecord {
        plan_id: plan.into(),
        beneficiary_id: beneficiary.into(),
        min_price: Amount::new(min_price),
        needed_price: Amount::new(needed_price),
    })?;
    Ok(())
}

/// Ledger holding the default scope.
pub fn seeded_ledger() -> Arc<InMemoryLedger> {
    let ledger = InMemoryLedger::new();
    seed_scope(&ledger, PLAN, BENEFICIARY, MIN_PRICE, NEEDED_PRICE)
        .unwrap_or_else(|e| panic!("seeding failed: {e}"));
    Arc::new(ledger)
}

/// Fixture service over any ledger, acting as `Org1MSP` at [`NOW`].
pub fn service_over<L>(ledger: Arc<L>) -> FixtureService<L>
where
    L: LedgerReader + LedgerWriter,
{
    OperationService::new(
        ledger,
        StaticIdentity::new("Org1MSP"),
        SequentialTrackingIds::new(),
        FixedTimeSource::new(NOW),
        ServiceConfig::default(),
    )
}

/// Donation in the default scope.
pub fn donation(amount: u64, source: &str, target: &str) -> OperationRequest {
    OperationRequest::donation(PLAN, BENEFICIARY, amount, NOW, source, target, VALID_DONOR)
}

/// Approval in the default scope.
pub fn approval(amount: u64, source: &str) -> OperationRequest {
    OperationRequest::approval(PLAN, BENEFICIARY, amount, NOW, source)
}

/// Settlement in the default scope.
pub fn settlement(amount: u64, source: &str, target: &str) -> OperationRequest {
    OperationRequest::settlement(PLAN, BENEFICIARY, amount, NOW, source, target)
}

/// Default scope identifiers.
pub fn scope_ids() -> (PlanId, BeneficiaryId) {
    (PLAN.into(), BENEFICIARY.into())
}
