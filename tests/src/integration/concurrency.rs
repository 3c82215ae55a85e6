//! # Concurrency
//!
//! Evaluation reads are validated at commit. These tests force another
//! writer in between the reads and the commit, then check that the late
//! writer is refused with a retryable conflict and that a retry re-evaluates
//! against the new state.

use af_operations::prelude::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::fixtures::NOW;

/// A write slipped in just before the next commit.
pub enum Interference {
    /// Another submitter records an operation.
    Submit(OperationRequest),
    /// An administrator changes the price thresholds.
    Reprice(ThresholdRecord),
}

/// Ledger that applies one pending [`Interference`] right before the next
/// `put` reaches the underlying ledger.
pub struct InterleavingLedger {
    inner: Arc<InMemoryLedger>,
    rival: OperationService<InMemoryLedger, StaticIdentity, UuidTrackingIds, FixedTimeSource>,
    pending: Mutex<Option<Interference>>,
}

impl InterleavingLedger {
    /// Wraps `inner`; the rival submitter writes to the same ledger under
    /// its own identity and random tracking ids.
    pub fn new(inner: Arc<InMemoryLedger>) -> Self {
        Self {
            rival: OperationService::new(
                Arc::clone(&inner),
                StaticIdentity::new("Org2MSP"),
                UuidTrackingIds,
                FixedTimeSource::new(NOW),
                ServiceConfig::default(),
            ),
            inner,
            pending: Mutex::new(None),
        }
    }

    /// Arms an interference for the next commit.
    pub fn interfere(&self, interference: Interference) {
        *self.pending.lock() = Some(interference);
    }

    async fn apply_pending(&self) -> Result<(), LedgerError> {
        let pending = self.pending.lock().take();
        match pending {
            Some(Interference::Submit(request)) => {
                let outcome = self
                    .rival
                    .create_operation(request)
                    .await
                    .map_err(|fault| LedgerError::Unavailable(fault.to_string()))?;
                assert!(outcome.is_accepted(), "rival write must land: {outcome:?}");
            }
            Some(Interference::Reprice(record)) => {
                self.inner.upsert(&record)?;
            }
            None => {}
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerReader for InterleavingLedger {
    async fn query(&self, predicate: &Predicate) -> Result<Vec<LedgerRecord>, LedgerError> {
        self.inner.query(predicate).await
    }
}

#[async_trait]
impl LedgerWriter for InterleavingLedger {
    async fn put(&self, write: PendingWrite, read_set: &ReadSet) -> Result<Version, LedgerError> {
        self.apply_pending().await?;
        self.inner.put(write, read_set).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    fn interleaved() -> (Arc<InMemoryLedger>, FixtureService<InterleavingLedger>) {
        let inner = seeded_ledger();
        let ledger = Arc::new(InterleavingLedger::new(Arc::clone(&inner)));
        (inner, service_over(ledger))
    }

    fn conflict(result: Result<OperationOutcome, ServiceFault>) -> ServiceFault {
        match result {
            Err(fault @ ServiceFault::Ledger(LedgerError::ReadSetConflict { .. })) => fault,
            other => panic!("expected read-set conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_competing_donation_invalidates_commit() {
        let (inner, service) = interleaved();

        service
            .ledger()
            .interfere(Interference::Submit(donation(60, "ngo-x", "ngo-b")));
        let fault = conflict(service.create_operation(donation(60, "ngo-a", "ngo-b")).await);
        assert!(fault.is_retryable());

        // Retrying sees D = 60 and refuses the overflow.
        match service.create_operation(donation(60, "ngo-a", "ngo-b")).await {
            Ok(OperationOutcome::Rejected(err)) => {
                assert_eq!(err.code(), "Payment.ExceedsNeededPrice");
            }
            other => panic!("expected rejection on retry, got {other:?}"),
        }

        let (plan, beneficiary) = scope_ids();
        let totals = service.scope_totals(&plan, &beneficiary).await.unwrap();
        assert_eq!(totals.donated, Amount::new(60));
        assert_eq!(inner.len(), 4);
    }

    #[tokio::test]
    async fn test_repriced_threshold_invalidates_commit() {
        let (_inner, service) = interleaved();

        service.ledger().interfere(Interference::Reprice(ThresholdRecord {
            plan_id: PLAN.into(),
            beneficiary_id: BENEFICIARY.into(),
            min_price: Amount::new(MIN_PRICE),
            needed_price: Amount::new(30),
        }));
        conflict(service.create_operation(donation(50, "ngo-a", "ngo-b")).await);

        match service.create_operation(donation(50, "ngo-a", "ngo-b")).await {
            Ok(OperationOutcome::Rejected(err)) => {
                assert_eq!(err.code(), "Payment.ExceedsNeededPrice");
            }
            other => panic!("expected rejection on retry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_write_to_another_scope_does_not_conflict() {
        let (inner, service) = interleaved();
        seed_scope(&inner, PLAN, "ben-0043", MIN_PRICE, NEEDED_PRICE).unwrap();

        service.ledger().interfere(Interference::Submit(OperationRequest::donation(
            PLAN,
            "ben-0043",
            40,
            NOW,
            "ngo-a",
            "ngo-b",
            VALID_DONOR,
        )));
        let outcome = service
            .create_operation(donation(40, "ngo-a", "ngo-b"))
            .await
            .unwrap();
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_approval_conflicts_with_same_source_approval() {
        let (_inner, service) = interleaved();
        service
            .create_operation(donation(50, "ngo-a", "ngo-b"))
            .await
            .unwrap();

        service
            .ledger()
            .interfere(Interference::Submit(approval(30, "ngo-a")));
        conflict(service.create_operation(approval(30, "ngo-a")).await);

        match service.create_operation(approval(30, "ngo-a")).await {
            Ok(OperationOutcome::Rejected(err)) => {
                assert_eq!(err.code(), "Approvement.ExceedsDonated");
            }
            other => panic!("expected rejection on retry, got {other:?}"),
        }
    }

    /// Many submitters race for the same scope; every loser of a commit race
    /// retries until it gets a decision.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_donations_never_overshoot() {
        let ledger = seeded_ledger();
        let service = Arc::new(service_over(Arc::clone(&ledger)));

        let mut handles = Vec::new();
        for i in 0..32 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let source = format!("ngo-{}", i % 4);
                for _ in 0..1_000 {
                    match service.create_operation(donation(10, &source, "ngo-z")).await {
                        Ok(outcome) => return outcome,
                        Err(fault) if fault.is_retryable() => tokio::task::yield_now().await,
                        Err(fault) => panic!("unexpected fault: {fault}"),
                    }
                }
                panic!("submitter {i} never reached a decision");
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            let outcome = handle.await.unwrap();
            if outcome.is_accepted() {
                accepted += 1;
            } else {
                assert_eq!(
                    outcome.rejection().map(OperationError::code),
                    Some("Payment.ExceedsNeededPrice")
                );
            }
        }

        assert_eq!(accepted, (NEEDED_PRICE / 10) as usize);
        let (plan, beneficiary) = scope_ids();
        let totals = service.scope_totals(&plan, &beneficiary).await.unwrap();
        assert_eq!(totals.donated, Amount::new(NEEDED_PRICE));
    }
}
