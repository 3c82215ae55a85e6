//! Subcommand handlers.
//!
//! Handlers return a [`Report`]; printing and exit codes are left to `main`.
//! Faults surface as errors.

use crate::cli::{SubmitArgs, TotalsArgs};
use crate::store::{load_ledger, save_ledger};
use af_operations::prelude::*;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tracing::Instrument;

/// How a command ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// Command succeeded; for `submit`, the operation was recorded.
    Success,
    /// The operation was rejected with a catalog error.
    Rejected,
}

impl Status {
    /// Process exit code. Faults exit with 1 from `main`.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Rejected => 2,
        }
    }
}

/// Command output.
#[derive(Debug)]
pub struct Report {
    /// How the command ended.
    pub status: Status,
    /// JSON written to stdout.
    pub output: Value,
}

/// `aidflow submit`
pub async fn submit(args: &SubmitArgs) -> Result<Report> {
    let ledger = Arc::new(load_ledger(&args.ledger)?);
    let raw = fs::read_to_string(&args.request)
        .with_context(|| format!("reading request {}", args.request.display()))?;
    let request: OperationRequest = serde_json::from_str(&raw)
        .with_context(|| format!("parsing request {}", args.request.display()))?;

    let service = OperationService::new(
        Arc::clone(&ledger),
        StaticIdentity::new(args.caller.as_str()),
        UuidTrackingIds,
        SystemTimeSource,
        ServiceConfig::default(),
    );

    let span = af_telemetry::operation_span!("submit", caller = %args.caller);
    match service.create_operation(request).instrument(span).await? {
        OperationOutcome::Accepted(operation) => {
            save_ledger(&ledger, &args.ledger)?;
            Ok(Report {
                status: Status::Success,
                output: json!({ "status": "accepted", "operation": operation }),
            })
        }
        OperationOutcome::Rejected(err) => Ok(Report {
            status: Status::Rejected,
            output: json!({
                "status": "rejected",
                "code": err.code(),
                "message": err.to_string(),
            }),
        }),
    }
}

/// `aidflow totals`
pub async fn totals(args: &TotalsArgs) -> Result<Report> {
    let ledger = Arc::new(load_ledger(&args.ledger)?);
    let service = OperationService::new(
        ledger,
        StaticIdentity::new("reader"),
        UuidTrackingIds,
        SystemTimeSource,
        ServiceConfig::default(),
    );

    let plan_id = PlanId::from(args.plan.as_str());
    let beneficiary_id = BeneficiaryId::from(args.beneficiary.as_str());
    let totals = service.scope_totals(&plan_id, &beneficiary_id).await?;
    Ok(Report {
        status: Status::Success,
        output: serde_json::to_value(totals)?,
    })
}
