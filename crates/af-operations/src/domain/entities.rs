//! Core domain entities for the operations subsystem.

use crate::domain::ledger::{EntityKind, LedgerEntity, LedgerKey};
use crate::domain::predicate::{Field, Predicate};
use crate::domain::value_objects::{
    Amount, BeneficiaryId, DonorIdentifier, OrgId, PlanId, Timestamp, TrackingId,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// STAGE
// =============================================================================

/// Life-cycle stage an operation is appended to.
///
/// Wire codes: `001` donated, `002` approved, `003` settled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Money pledged by a donor to a beneficiary under a plan.
    #[serde(rename = "001")]
    Donated,
    /// Donated money approved for disbursement by the source organization.
    #[serde(rename = "002")]
    Approved,
    /// Approved money settled from the source to a target organization.
    #[serde(rename = "003")]
    Settled,
}

impl Stage {
    /// All stages in life-cycle order.
    pub const ALL: [Self; 3] = [Self::Donated, Self::Approved, Self::Settled];

    /// Wire code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Donated => "001",
            Self::Approved => "002",
            Self::Settled => "003",
        }
    }

    /// Parses a wire code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|stage| stage.code() == code)
    }

    /// Approvals are the only stage recorded without a target organization.
    #[must_use]
    pub const fn requires_target_org(self) -> bool {
        !matches!(self, Self::Approved)
    }

    /// Only donations carry a donor identifier.
    #[must_use]
    pub const fn requires_donor_identifier(self) -> bool {
        matches!(self, Self::Donated)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Donated => "donated",
            Self::Approved => "approved",
            Self::Settled => "settled",
        };
        write!(f, "{name}({})", self.code())
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Raw operation request as submitted by the caller.
///
/// Empty strings and absent numbers mean "not supplied". A present zero is
/// a value and goes through the normal checks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationRequest {
    /// Funding plan.
    pub plan_id: PlanId,
    /// Beneficiary receiving the benefit.
    pub beneficiary_id: BeneficiaryId,
    /// Amount in minor units.
    pub amount: Option<Amount>,
    /// Caller-supplied time of the operation (Unix ms).
    pub occurred_at: Option<Timestamp>,
    /// Organization the money moves from.
    pub source_org: OrgId,
    /// Organization the money moves to.
    pub target_org: OrgId,
    /// Stage wire code.
    pub stage: String,
    /// Donor national identifier (donations only).
    pub donor_identifier: DonorIdentifier,
}

impl OperationRequest {
    /// Donation request.
    #[must_use]
    pub fn donation(
        plan_id: impl Into<PlanId>,
        beneficiary_id: impl Into<BeneficiaryId>,
        amount: u64,
        occurred_at: Timestamp,
        source_org: impl Into<OrgId>,
        target_org: impl Into<OrgId>,
        donor_identifier: impl Into<DonorIdentifier>,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            beneficiary_id: beneficiary_id.into(),
            amount: Some(Amount::new(amount)),
            occurred_at: Some(occurred_at),
            source_org: source_org.into(),
            target_org: target_org.into(),
            stage: Stage::Donated.code().to_string(),
            donor_identifier: donor_identifier.into(),
        }
    }

    /// Approval request.
    #[must_use]
    pub fn approval(
        plan_id: impl Into<PlanId>,
        beneficiary_id: impl Into<BeneficiaryId>,
        amount: u64,
        occurred_at: Timestamp,
        source_org: impl Into<OrgId>,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            beneficiary_id: beneficiary_id.into(),
            amount: Some(Amount::new(amount)),
            occurred_at: Some(occurred_at),
            source_org: source_org.into(),
            stage: Stage::Approved.code().to_string(),
            ..Self::default()
        }
    }

    /// Settlement request.
    #[must_use]
    pub fn settlement(
        plan_id: impl Into<PlanId>,
        beneficiary_id: impl Into<BeneficiaryId>,
        amount: u64,
        occurred_at: Timestamp,
        source_org: impl Into<OrgId>,
        target_org: impl Into<OrgId>,
    ) -> Self {
        Self {
            plan_id: plan_id.into(),
            beneficiary_id: beneficiary_id.into(),
            amount: Some(Amount::new(amount)),
            occurred_at: Some(occurred_at),
            source_org: source_org.into(),
            target_org: target_org.into(),
            stage: Stage::Settled.code().to_string(),
            ..Self::default()
        }
    }
}

/// A request that passed the validation gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Funding plan.
    pub plan_id: PlanId,
    /// Beneficiary.
    pub beneficiary_id: BeneficiaryId,
    /// Amount, possibly zero.
    pub amount: Amount,
    /// Caller-supplied time.
    pub occurred_at: Timestamp,
    /// Source organization.
    pub source_org: OrgId,
    /// Target organization; may be empty for approvals.
    pub target_org: OrgId,
    /// Parsed stage.
    pub stage: Stage,
    /// Checksum-valid donor identifier, present for donations only.
    pub donor_identifier: Option<DonorIdentifier>,
}

impl ValidatedRequest {
    /// The (plan, beneficiary) scope of this request.
    #[must_use]
    pub fn scope(&self) -> OperationScope {
        OperationScope::new(self.plan_id.clone(), self.beneficiary_id.clone())
    }
}

// =============================================================================
// OPERATION
// =============================================================================

/// An accepted operation. Append-only: written once, never modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    tracking_id: TrackingId,
    plan_id: PlanId,
    beneficiary_id: BeneficiaryId,
    amount: Amount,
    occurred_at: Timestamp,
    source_org: OrgId,
    target_org: OrgId,
    stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    donor_identifier: Option<DonorIdentifier>,
    owner_org: OrgId,
    recorded_owner: OrgId,
}

impl Operation {
    /// Stamps a validated request with ownership and a tracking id.
    ///
    /// Approvals are stored without a target organization and only donations
    /// keep the donor identifier.
    pub(crate) fn assemble(
        request: ValidatedRequest,
        owner_org: OrgId,
        tracking_id: TrackingId,
    ) -> Self {
        let target_org = match request.stage {
            Stage::Approved => OrgId::default(),
            Stage::Donated | Stage::Settled => request.target_org,
        };
        let donor_identifier = match request.stage {
            Stage::Donated => request.donor_identifier,
            Stage::Approved | Stage::Settled => None,
        };
        let recorded_owner = request.source_org.clone();

        Self {
            tracking_id,
            plan_id: request.plan_id,
            beneficiary_id: request.beneficiary_id,
            amount: request.amount,
            occurred_at: request.occurred_at,
            source_org: request.source_org,
            target_org,
            stage: request.stage,
            donor_identifier,
            owner_org,
            recorded_owner,
        }
    }

    /// Unique tracking id.
    #[must_use]
    pub fn tracking_id(&self) -> TrackingId {
        self.tracking_id
    }

    /// Funding plan.
    #[must_use]
    pub fn plan_id(&self) -> &PlanId {
        &self.plan_id
    }

    /// Beneficiary.
    #[must_use]
    pub fn beneficiary_id(&self) -> &BeneficiaryId {
        &self.beneficiary_id
    }

    /// Amount in minor units.
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Caller-supplied time.
    #[must_use]
    pub fn occurred_at(&self) -> Timestamp {
        self.occurred_at
    }

    /// Source organization.
    #[must_use]
    pub fn source_org(&self) -> &OrgId {
        &self.source_org
    }

    /// Target organization (empty for approvals).
    #[must_use]
    pub fn target_org(&self) -> &OrgId {
        &self.target_org
    }

    /// Stage bucket.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Donor identifier (donations only).
    #[must_use]
    pub fn donor_identifier(&self) -> Option<&DonorIdentifier> {
        self.donor_identifier.as_ref()
    }

    /// Technical owner: organization credential of the submitting caller.
    #[must_use]
    pub fn owner_org(&self) -> &OrgId {
        &self.owner_org
    }

    /// Business owner: the source organization.
    #[must_use]
    pub fn recorded_owner(&self) -> &OrgId {
        &self.recorded_owner
    }
}

impl LedgerEntity for Operation {
    const KIND: EntityKind = EntityKind::Operation;

    fn ledger_key(&self) -> LedgerKey {
        LedgerKey::composite(
            Self::KIND,
            &[
                self.plan_id.as_str(),
                self.beneficiary_id.as_str(),
                &self.tracking_id.to_string(),
            ],
        )
    }
}

// =============================================================================
// REFERENCE ENTITIES (read-only to this subsystem)
// =============================================================================

/// Registered beneficiary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    /// Beneficiary identifier.
    pub beneficiary_id: BeneficiaryId,
}

impl LedgerEntity for Beneficiary {
    const KIND: EntityKind = EntityKind::Beneficiary;

    fn ledger_key(&self) -> LedgerKey {
        LedgerKey::composite(Self::KIND, &[self.beneficiary_id.as_str()])
    }
}

/// Membership of a beneficiary in a plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAllocation {
    /// Plan.
    pub plan_id: PlanId,
    /// Allocated beneficiary.
    pub beneficiary_id: BeneficiaryId,
}

impl LedgerEntity for PlanAllocation {
    const KIND: EntityKind = EntityKind::PlanAllocation;

    fn ledger_key(&self) -> LedgerKey {
        LedgerKey::composite(
            Self::KIND,
            &[self.plan_id.as_str(), self.beneficiary_id.as_str()],
        )
    }
}

/// Price thresholds for one beneficiary under one plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRecord {
    /// Plan.
    pub plan_id: PlanId,
    /// Beneficiary.
    pub beneficiary_id: BeneficiaryId,
    /// Smallest accepted single donation.
    pub min_price: Amount,
    /// Total the beneficiary needs under the plan.
    pub needed_price: Amount,
}

impl ThresholdRecord {
    /// Thresholds carried by this record.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            min_price: self.min_price,
            needed_price: self.needed_price,
        }
    }
}

impl LedgerEntity for ThresholdRecord {
    const KIND: EntityKind = EntityKind::ThresholdRecord;

    fn ledger_key(&self) -> LedgerKey {
        LedgerKey::composite(
            Self::KIND,
            &[self.plan_id.as_str(), self.beneficiary_id.as_str()],
        )
    }
}

/// Resolved min/needed price pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    /// Smallest accepted single donation.
    pub min_price: Amount,
    /// Ceiling for donated and approved totals.
    pub needed_price: Amount,
}

// =============================================================================
// SCOPES AND TOTALS
// =============================================================================

/// Aggregation scope: (plan, beneficiary[, source org[, target org]]).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperationScope {
    /// Plan.
    pub plan_id: PlanId,
    /// Beneficiary.
    pub beneficiary_id: BeneficiaryId,
    /// Narrows to operations from this organization.
    pub source_org: Option<OrgId>,
    /// Narrows to operations towards this organization.
    pub target_org: Option<OrgId>,
}

impl OperationScope {
    /// (plan, beneficiary) scope.
    #[must_use]
    pub fn new(plan_id: PlanId, beneficiary_id: BeneficiaryId) -> Self {
        Self {
            plan_id,
            beneficiary_id,
            source_org: None,
            target_org: None,
        }
    }

    /// Narrows the scope to a source organization.
    #[must_use]
    pub fn with_source(mut self, source_org: OrgId) -> Self {
        self.source_org = Some(source_org);
        self
    }

    /// Narrows the scope to a target organization.
    #[must_use]
    pub fn with_target(mut self, target_org: OrgId) -> Self {
        self.target_org = Some(target_org);
        self
    }

    /// Predicate selecting the operations of `stage` inside this scope.
    #[must_use]
    pub fn predicate(&self, stage: Stage) -> Predicate {
        let mut predicate = Predicate::new(EntityKind::Operation)
            .with(Field::PlanId, self.plan_id.as_str())
            .with(Field::BeneficiaryId, self.beneficiary_id.as_str())
            .with(Field::Stage, stage.code());
        if let Some(source) = &self.source_org {
            predicate = predicate.with(Field::SourceOrg, source.as_str());
        }
        if let Some(target) = &self.target_org {
            predicate = predicate.with(Field::TargetOrg, target.as_str());
        }
        predicate
    }
}

impl fmt::Display for OperationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.plan_id, self.beneficiary_id)?;
        if let Some(source) = &self.source_org {
            write!(f, " from {source}")?;
        }
        if let Some(target) = &self.target_org {
            write!(f, " to {target}")?;
        }
        Ok(())
    }
}

/// Per-stage totals for a (plan, beneficiary) scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTotals {
    /// Sum of donations.
    pub donated: Amount,
    /// Sum of approvals across source organizations.
    pub approved: Amount,
    /// Sum of settlements across organizations.
    pub settled: Amount,
}
