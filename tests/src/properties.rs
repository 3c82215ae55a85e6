//! # Flow Conservation Properties
//!
//! Random sequences of donations, approvals and settlements are pushed through
//! the service. Whatever got accepted must satisfy, for the final ledger:
//!
//! - every donation is at least the minimum price
//! - donated total ≤ needed price
//! - approved per source ≤ min(needed price, donated total)
//! - settled per source ≤ approved per source
//! - settled per (source, target) ≤ donated per (source, target)

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use af_operations::prelude::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    const SOURCES: [&str; 2] = ["ngo-a", "ngo-b"];
    const TARGETS: [&str; 2] = ["ngo-b", "ngo-c"];

    #[derive(Clone, Debug)]
    struct Step {
        stage: Stage,
        amount: u64,
        source: usize,
        target: usize,
    }

    impl Step {
        fn request(&self) -> OperationRequest {
            let source = SOURCES[self.source];
            let target = TARGETS[self.target];
            match self.stage {
                Stage::Donated => donation(self.amount, source, target),
                Stage::Approved => approval(self.amount, source),
                Stage::Settled => settlement(self.amount, source, target),
            }
        }
    }

    fn step() -> impl Strategy<Value = Step> {
        (
            prop::sample::select(Stage::ALL.to_vec()),
            1u64..70,
            0..SOURCES.len(),
            0..TARGETS.len(),
        )
            .prop_map(|(stage, amount, source, target)| Step {
                stage,
                amount,
                source,
                target,
            })
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
    }

    #[derive(Default)]
    struct Sums {
        donated: u64,
        donated_edge: HashMap<(String, String), u64>,
        approved: HashMap<String, u64>,
        settled: HashMap<String, u64>,
        settled_edge: HashMap<(String, String), u64>,
    }

    fn sums(history: &[Operation]) -> Sums {
        let mut sums = Sums::default();
        for op in history {
            let source = op.source_org().to_string();
            let edge = (source.clone(), op.target_org().to_string());
            let amount = op.amount().units();
            match op.stage() {
                Stage::Donated => {
                    sums.donated += amount;
                    *sums.donated_edge.entry(edge).or_default() += amount;
                }
                Stage::Approved => *sums.approved.entry(source).or_default() += amount,
                Stage::Settled => {
                    *sums.settled.entry(source).or_default() += amount;
                    *sums.settled_edge.entry(edge).or_default() += amount;
                }
            }
        }
        sums
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn accepted_operations_conserve_flow(steps in prop::collection::vec(step(), 1..40)) {
            let history = runtime().block_on(async {
                let service = service_over(seeded_ledger());
                for step in &steps {
                    service.create_operation(step.request()).await.unwrap();
                }
                let (plan, beneficiary) = scope_ids();
                service.history(&plan, &beneficiary).await.unwrap()
            });

            for op in history.iter().filter(|op| op.stage() == Stage::Donated) {
                prop_assert!(op.amount().units() >= MIN_PRICE);
            }

            let sums = sums(&history);
            prop_assert!(sums.donated <= NEEDED_PRICE);
            for approved in sums.approved.values() {
                prop_assert!(*approved <= NEEDED_PRICE.min(sums.donated));
            }
            for (source, settled) in &sums.settled {
                let approved = sums.approved.get(source).copied().unwrap_or(0);
                prop_assert!(*settled <= approved);
            }
            for (edge, settled) in &sums.settled_edge {
                let donated = sums.donated_edge.get(edge).copied().unwrap_or(0);
                prop_assert!(*settled <= donated);
            }
        }

        #[test]
        fn check_predicts_create(
            history in prop::collection::vec(step(), 0..20),
            probe in step(),
        ) {
            runtime().block_on(async {
                let service = service_over(seeded_ledger());
                for step in &history {
                    service.create_operation(step.request()).await.unwrap();
                }

                let first = service.check_operation(&probe.request()).await.unwrap();
                let second = service.check_operation(&probe.request()).await.unwrap();
                assert_eq!(first, second);

                match (first, service.create_operation(probe.request()).await.unwrap()) {
                    (Verdict::Accept, OperationOutcome::Accepted(_)) => {}
                    (Verdict::Reject(expected), OperationOutcome::Rejected(actual)) => {
                        assert_eq!(expected.code(), actual.code());
                    }
                    (verdict, outcome) => panic!("check said {verdict:?}, create said {outcome:?}"),
                }
            });
        }

        #[test]
        fn national_id_body_has_one_check_digit(digits in prop::collection::vec(0u8..10, 9)) {
            let body: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
            let valid: Vec<String> = (0..=9)
                .map(|c| format!("{body}{c}"))
                .filter(|id| is_valid_national_id(id))
                .collect();

            prop_assert!(valid.len() <= 1);
            if valid.is_empty() {
                // Only a repeated digit can lose its single completion.
                prop_assert!(digits.iter().all(|d| *d == digits[0]));
            }
        }
    }
}
