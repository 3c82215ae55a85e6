//! # Integration Test Flows
//!
//! Drives the service only through the `OperationApi` trait object, the way
//! the transaction layer does.
//!
//! ## Flow Tested:
//!
//! 1. **Donations** fill the scope up to the needed price
//! 2. **Approvals** by a source organization are capped by what was donated
//! 3. **Settlements** are capped by the source's approvals and by what that
//!    source donated to the target

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use af_operations::prelude::*;

    // =============================================================================
    // HELPERS
    // =============================================================================

    async fn expect_code(api: &dyn OperationApi, request: OperationRequest, code: &str) {
        match api.create_operation(request).await {
            Ok(OperationOutcome::Rejected(err)) => assert_eq!(err.code(), code),
            other => panic!("expected {code}, got {other:?}"),
        }
    }

    async fn expect_accept(api: &dyn OperationApi, request: OperationRequest) -> Operation {
        match api.create_operation(request).await {
            Ok(OperationOutcome::Accepted(op)) => op,
            other => panic!("expected acceptance, got {other:?}"),
        }
    }

    // =============================================================================
    // END-TO-END SEQUENCE
    // =============================================================================

    #[tokio::test]
    async fn test_full_lifecycle_conserves_flow() {
        let ledger = seeded_ledger();
        let service = service_over(ledger.clone());
        let api: &dyn OperationApi = &service;

        // D = 60, of which 40 went from ngo-a to ngo-b
        expect_accept(api, donation(40, "ngo-a", "ngo-b")).await;
        expect_accept(api, donation(20, "ngo-a", "ngo-c")).await;
        expect_code(api, donation(50, "ngo-a", "ngo-b"), "Payment.ExceedsNeededPrice").await;

        expect_code(api, approval(70, "ngo-a"), "Approvement.ExceedsDonated").await;
        expect_accept(api, approval(60, "ngo-a")).await;

        expect_code(api, settlement(70, "ngo-a", "ngo-b"), "Settlement.ExceedsApproved").await;
        expect_code(api, settlement(60, "ngo-a", "ngo-b"), "Settlement.ExceedsDonated").await;

        expect_accept(api, settlement(40, "ngo-a", "ngo-b")).await;
        expect_accept(api, settlement(20, "ngo-a", "ngo-c")).await;
        expect_code(api, settlement(1, "ngo-a", "ngo-c"), "Settlement.ExceedsApproved").await;

        let (plan, beneficiary) = scope_ids();
        let totals = api.scope_totals(&plan, &beneficiary).await.unwrap();
        assert_eq!(
            totals,
            StageTotals {
                donated: Amount::new(60),
                approved: Amount::new(60),
                settled: Amount::new(60),
            }
        );

        let history = api.history(&plan, &beneficiary).await.unwrap();
        assert_eq!(history.len(), 5);
        // 3 reference records + 5 operations; rejections wrote nothing.
        assert_eq!(ledger.len(), 8);
    }

    #[tokio::test]
    async fn test_approvals_are_capped_per_source() {
        let service = service_over(seeded_ledger());
        let api: &dyn OperationApi = &service;

        expect_accept(api, donation(80, "ngo-a", "ngo-b")).await;

        // Each source may approve up to the donated total on its own.
        expect_accept(api, approval(80, "ngo-a")).await;
        expect_accept(api, approval(80, "ngo-b")).await;
        expect_code(api, approval(1, "ngo-a"), "Approvement.ExceedsDonated").await;
    }

    #[tokio::test]
    async fn test_approval_capped_by_needed_price_first() {
        let service = service_over(seeded_ledger());
        let api: &dyn OperationApi = &service;

        expect_accept(api, donation(100, "ngo-a", "ngo-b")).await;
        expect_code(api, approval(101, "ngo-a"), "Approvement.ExceedsNeededPrice").await;
    }

    #[tokio::test]
    async fn test_settlement_needs_donation_along_the_same_edge() {
        let service = service_over(seeded_ledger());
        let api: &dyn OperationApi = &service;

        expect_accept(api, donation(50, "ngo-a", "ngo-b")).await;
        expect_accept(api, approval(50, "ngo-a")).await;

        // Nothing flowed from ngo-a to ngo-c.
        expect_code(api, settlement(10, "ngo-a", "ngo-c"), "Settlement.ExceedsDonated").await;
        expect_accept(api, settlement(50, "ngo-a", "ngo-b")).await;
    }

    #[tokio::test]
    async fn test_scopes_are_independent() {
        let ledger = seeded_ledger();
        seed_scope(&ledger, PLAN, "ben-0043", MIN_PRICE, 50).unwrap();
        let service = service_over(ledger);
        let api: &dyn OperationApi = &service;

        expect_accept(api, donation(100, "ngo-a", "ngo-b")).await;

        let other = OperationRequest::donation(
            PLAN, "ben-0043", 50, NOW, "ngo-a", "ngo-b", VALID_DONOR,
        );
        expect_accept(api, other).await;

        let totals = api
            .scope_totals(&PLAN.into(), &"ben-0043".into())
            .await
            .unwrap();
        assert_eq!(totals.donated, Amount::new(50));
    }

    // =============================================================================
    // VALIDATION GATE
    // =============================================================================

    #[tokio::test]
    async fn test_gate_rejections_touch_no_ledger_state() {
        let ledger = seeded_ledger();
        let service = service_over(ledger.clone());
        let api: &dyn OperationApi = &service;

        let mut bad_checksum = donation(40, "ngo-a", "ngo-b");
        bad_checksum.donor_identifier = "1234567890".into();
        expect_code(api, bad_checksum, "Common.InvalidDonorChecksum").await;

        let mut no_donor = donation(40, "ngo-a", "ngo-b");
        no_donor.donor_identifier = "".into();
        expect_code(api, no_donor, "Common.MissingDonorIdentifier").await;

        expect_code(api, settlement(40, "ngo-a", ""), "Common.MissingTargetOrg").await;

        let mut stale = donation(40, "ngo-a", "ngo-b");
        stale.occurred_at = Some(NOW - STALENESS_TOLERANCE_MS - 1);
        expect_code(api, stale, "Common.StaleTimestamp").await;

        let mut unknown = donation(40, "ngo-a", "ngo-b");
        unknown.stage = "004".to_string();
        expect_code(api, unknown, "Common.UnknownStage").await;

        assert_eq!(ledger.len(), 3);
    }

    #[tokio::test]
    async fn test_boundary_timestamp_is_accepted() {
        let service = service_over(seeded_ledger());
        let mut request = donation(40, "ngo-a", "ngo-b");
        request.occurred_at = Some(NOW - STALENESS_TOLERANCE_MS);
        expect_accept(&service, request).await;
    }

    #[tokio::test]
    async fn test_request_from_json() {
        let service = service_over(seeded_ledger());
        let request: OperationRequest = serde_json::from_value(serde_json::json!({
            "planId": PLAN,
            "beneficiaryId": BENEFICIARY,
            "amount": 25,
            "occurredAt": NOW,
            "sourceOrg": "ngo-a",
            "targetOrg": "ngo-b",
            "stage": "001",
            "donorIdentifier": VALID_DONOR,
        }))
        .unwrap();

        let op = expect_accept(&service, request).await;
        assert_eq!(op.stage(), Stage::Donated);
        assert_eq!(op.amount(), Amount::new(25));
    }
}
