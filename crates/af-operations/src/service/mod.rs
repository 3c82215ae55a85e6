//! # Operation Service
//!
//! Orchestrates the evaluation pipeline for one submission:
//!
//! 1. Validation gate (no ledger access)
//! 2. Reference resolution: beneficiary, allocation, thresholds
//! 3. Stage aggregates for the request's scope
//! 4. Transition inequalities
//! 5. Operation assembly and a single append-only write
//!
//! Every ledger query made in steps 2 and 3 is captured in a [`ReadSet`] and
//! handed to the writer, which refuses to commit if any of those reads has
//! changed since. The write is the only side effect; a rejection or fault at
//! any earlier step leaves the ledger untouched.

pub mod aggregator;
pub mod factory;
pub mod resolver;

pub use aggregator::StateAggregator;
pub use factory::OperationFactory;
pub use resolver::ThresholdResolver;

use crate::domain::entities::{Operation, OperationRequest, OperationScope, Stage, StageTotals};
use crate::domain::ledger::{EntityKind, PendingWrite, ReadSet};
use crate::domain::predicate::{Field, Predicate};
use crate::domain::transition::evaluate_transition;
use crate::domain::validation::{validate_request, STALENESS_TOLERANCE_MS};
use crate::domain::value_objects::{BeneficiaryId, PlanId};
use crate::domain::ValidatedRequest;
use crate::errors::{EvaluationError, ServiceFault};
use crate::ports::inbound::{OperationApi, OperationOutcome, Verdict};
use crate::ports::outbound::{
    IdentityProvider, LedgerReader, LedgerWriter, TimeSource, TrackingIdGenerator,
};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Operation service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum age of a caller timestamp, in milliseconds.
    pub staleness_tolerance_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            staleness_tolerance_ms: STALENESS_TOLERANCE_MS,
        }
    }
}

/// The operations service.
///
/// Generic over the ledger and the three injected capabilities so tests can
/// pin identity, tracking ids and time. Holds no mutable state; every
/// submission reads the ledger afresh and outcomes are reported as events.
pub struct OperationService<L, I, G, T> {
    config: ServiceConfig,
    ledger: Arc<L>,
    identity: I,
    ids: G,
    clock: T,
}

impl<L, I, G, T> OperationService<L, I, G, T>
where
    L: LedgerReader + LedgerWriter,
    I: IdentityProvider,
    G: TrackingIdGenerator,
    T: TimeSource,
{
    /// Create a new operation service.
    pub fn new(ledger: Arc<L>, identity: I, ids: G, clock: T, config: ServiceConfig) -> Self {
        Self {
            config,
            ledger,
            identity,
            ids,
            clock,
        }
    }

    /// The ledger this service reads from and writes to.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Active configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Runs validation, reference resolution, aggregation and the stage
    /// inequalities. Reads nothing the read set does not capture.
    #[instrument(skip(self, request, read_set), fields(stage = %request.stage, plan = %request.plan_id))]
    async fn evaluate(
        &self,
        request: &OperationRequest,
        read_set: &mut ReadSet,
    ) -> Result<ValidatedRequest, EvaluationError> {
        let now = self.clock.now();
        let validated = validate_request(request, now, self.config.staleness_tolerance_ms)?;

        let thresholds = ThresholdResolver::new(self.ledger.as_ref())
            .resolve(&validated.plan_id, &validated.beneficiary_id, read_set)
            .await?;
        let aggregates = StateAggregator::new(self.ledger.as_ref())
            .stage_aggregates(&validated, read_set)
            .await?;

        evaluate_transition(validated.amount, &thresholds, &aggregates)?;
        debug!(
            amount = %validated.amount,
            queries = read_set.len(),
            "Evaluation passed"
        );
        Ok(validated)
    }

    #[instrument(skip(self, request), fields(beneficiary = %request.beneficiary_id))]
    async fn submit(&self, request: &OperationRequest) -> Result<Operation, EvaluationError> {
        let mut read_set = ReadSet::new();
        let validated = self.evaluate(request, &mut read_set).await?;

        let operation = OperationFactory::new(&self.identity, &self.ids)
            .build(validated)
            .map_err(ServiceFault::from)?;
        let write = PendingWrite::from_entity(&operation)?;
        let version = self.ledger.put(write, &read_set).await?;

        info!(
            tracking_id = %operation.tracking_id(),
            stage = %operation.stage(),
            amount = %operation.amount(),
            version,
            "Operation recorded"
        );
        Ok(operation)
    }
}

#[async_trait]
impl<L, I, G, T> OperationApi for OperationService<L, I, G, T>
where
    L: LedgerReader + LedgerWriter,
    I: IdentityProvider,
    G: TrackingIdGenerator,
    T: TimeSource,
{
    async fn create_operation(
        &self,
        request: OperationRequest,
    ) -> Result<OperationOutcome, ServiceFault> {
        match self.submit(&request).await {
            Ok(operation) => Ok(OperationOutcome::Accepted(operation)),
            Err(EvaluationError::Rejected(err)) => {
                warn!(code = err.code(), reason = %err, "Operation rejected");
                Ok(OperationOutcome::Rejected(err))
            }
            Err(EvaluationError::Fault(fault)) => {
                error!(
                    error = %fault,
                    retryable = fault.is_retryable(),
                    "Operation aborted"
                );
                Err(fault)
            }
        }
    }

    async fn check_operation(&self, request: &OperationRequest) -> Result<Verdict, ServiceFault> {
        let mut read_set = ReadSet::new();
        match self.evaluate(request, &mut read_set).await {
            Ok(_) => Ok(Verdict::Accept),
            Err(EvaluationError::Rejected(err)) => Ok(Verdict::Reject(err)),
            Err(EvaluationError::Fault(fault)) => Err(fault),
        }
    }

    async fn scope_totals(
        &self,
        plan_id: &PlanId,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<StageTotals, ServiceFault> {
        let scope = OperationScope::new(plan_id.clone(), beneficiary_id.clone());
        let aggregator = StateAggregator::new(self.ledger.as_ref());
        let mut read_set = ReadSet::new();

        Ok(StageTotals {
            donated: aggregator
                .sum_amounts(&scope, Stage::Donated, &mut read_set)
                .await?,
            approved: aggregator
                .sum_amounts(&scope, Stage::Approved, &mut read_set)
                .await?,
            settled: aggregator
                .sum_amounts(&scope, Stage::Settled, &mut read_set)
                .await?,
        })
    }

    async fn history(
        &self,
        plan_id: &PlanId,
        beneficiary_id: &BeneficiaryId,
    ) -> Result<Vec<Operation>, ServiceFault> {
        let predicate = Predicate::new(EntityKind::Operation)
            .with(Field::PlanId, plan_id.as_str())
            .with(Field::BeneficiaryId, beneficiary_id.as_str());
        let records = self.ledger.query(&predicate).await?;

        let mut operations = records
            .iter()
            .map(|record| record.decode::<Operation>())
            .collect::<Result<Vec<_>, _>>()?;
        operations.sort_by_key(|op| (op.occurred_at(), op.tracking_id()));
        Ok(operations)
    }
}

// =============================================================================
// TESTS
// =============================================================================
