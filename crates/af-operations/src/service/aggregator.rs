//! State aggregator: sums historical operation amounts per stage and scope.

use crate::domain::entities::{Operation, OperationScope, Stage, ValidatedRequest};
use crate::domain::ledger::ReadSet;
use crate::domain::transition::StageAggregates;
use crate::domain::value_objects::Amount;
use crate::errors::LedgerError;
use crate::ports::outbound::LedgerReader;
use tracing::debug;

/// Sums operation amounts through a ledger reader.
///
/// Every query is appended to the caller's [`ReadSet`].
pub struct StateAggregator<'a, R: ?Sized> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> StateAggregator<'a, R> {
    /// Aggregator over `reader`.
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Sum of `amount` over operations of `stage` inside `scope`.
    pub async fn sum_amounts(
        &self,
        scope: &OperationScope,
        stage: Stage,
        read_set: &mut ReadSet,
    ) -> Result<Amount, LedgerError> {
        let predicate = scope.predicate(stage);
        let records = self.reader.query(&predicate).await?;

        let mut total = Amount::ZERO;
        for record in &records {
            let operation: Operation = record.decode()?;
            total = total.saturating_add(operation.amount());
        }

        debug!(
            stage = %stage,
            scope = %scope,
            matched = records.len(),
            total = %total,
            "Aggregated operation amounts"
        );
        read_set.record(predicate, &records);
        Ok(total)
    }

    /// Gathers exactly the sums the request's stage is checked against.
    pub async fn stage_aggregates(
        &self,
        request: &ValidatedRequest,
        read_set: &mut ReadSet,
    ) -> Result<StageAggregates, LedgerError> {
        let scope = request.scope();
        let by_source = scope.clone().with_source(request.source_org.clone());

        let aggregates = match request.stage {
            Stage::Donated => StageAggregates::Donated {
                donated: self.sum_amounts(&scope, Stage::Donated, read_set).await?,
            },
            Stage::Approved => StageAggregates::Approved {
                approved: self.sum_amounts(&by_source, Stage::Approved, read_set).await?,
                donated: self.sum_amounts(&scope, Stage::Donated, read_set).await?,
            },
            Stage::Settled => {
                let pair = by_source.clone().with_target(request.target_org.clone());
                StageAggregates::Settled {
                    approved: self.sum_amounts(&by_source, Stage::Approved, read_set).await?,
                    settled_by_source: self
                        .sum_amounts(&by_source, Stage::Settled, read_set)
                        .await?,
                    settled_to_target: self.sum_amounts(&pair, Stage::Settled, read_set).await?,
                    donated_to_target: self.sum_amounts(&pair, Stage::Donated, read_set).await?,
                }
            }
        };
        Ok(aggregates)
    }
}
