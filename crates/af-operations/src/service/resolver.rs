//! Threshold resolver: beneficiary, allocation and price reference data.

use crate::domain::entities::{Thresholds, ThresholdRecord};
use crate::domain::ledger::{EntityKind, LedgerRecord, ReadSet};
use crate::domain::predicate::{Field, Predicate};
use crate::domain::value_objects::{BeneficiaryId, PlanId};
use crate::errors::{CommonError, EvaluationError, LedgerError};
use crate::ports::outbound::LedgerReader;
use tracing::debug;

/// Resolves reference data for a (plan, beneficiary) pair.
pub struct ThresholdResolver<'a, R: ?Sized> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> ThresholdResolver<'a, R> {
    /// Resolver over `reader`.
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Checks beneficiary existence and plan membership, then returns the
    /// price thresholds. Each missing reference has its own rejection.
    pub async fn resolve(
        &self,
        plan_id: &PlanId,
        beneficiary_id: &BeneficiaryId,
        read_set: &mut ReadSet,
    ) -> Result<Thresholds, EvaluationError> {
        let beneficiary = Predicate::new(EntityKind::Beneficiary)
            .with(Field::BeneficiaryId, beneficiary_id.as_str());
        if self.lookup(beneficiary, read_set).await?.is_empty() {
            return Err(CommonError::BeneficiaryNotFound.into());
        }

        let allocation = Predicate::new(EntityKind::PlanAllocation)
            .with(Field::PlanId, plan_id.as_str())
            .with(Field::BeneficiaryId, beneficiary_id.as_str());
        if self.lookup(allocation, read_set).await?.is_empty() {
            return Err(CommonError::BeneficiaryNotAllocated.into());
        }

        let threshold = Predicate::new(EntityKind::ThresholdRecord)
            .with(Field::PlanId, plan_id.as_str())
            .with(Field::BeneficiaryId, beneficiary_id.as_str());
        let records = self.lookup(threshold, read_set).await?;
        let record = records.first().ok_or(CommonError::ThresholdNotFound)?;
        let thresholds = record.decode::<ThresholdRecord>()?.thresholds();

        debug!(
            plan = %plan_id,
            beneficiary = %beneficiary_id,
            min_price = %thresholds.min_price,
            needed_price = %thresholds.needed_price,
            "Resolved thresholds"
        );
        Ok(thresholds)
    }

    async fn lookup(
        &self,
        predicate: Predicate,
        read_set: &mut ReadSet,
    ) -> Result<Vec<LedgerRecord>, LedgerError> {
        let records = self.reader.query(&predicate).await?;
        read_set.record(predicate, &records);
        Ok(records)
    }
}
