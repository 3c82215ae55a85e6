//! Validation gate: structural, temporal and donor-checksum checks.
//!
//! Runs before any ledger access. Check order:
//!
//! 1. staleness (when a timestamp is present)
//! 2. required fields
//! 3. target organization (all stages except approval)
//! 4. donor identifier presence, then checksum (donations only)

use crate::domain::entities::{OperationRequest, Stage, ValidatedRequest};
use crate::domain::value_objects::Timestamp;
use crate::errors::CommonError;

/// Default tolerance for caller timestamps: 5 minutes.
pub const STALENESS_TOLERANCE_MS: u64 = 5 * 60 * 1000;

/// Length of a donor national identifier.
pub const NATIONAL_ID_LENGTH: usize = 10;

/// Validates a raw request against the processing time.
///
/// Future timestamps are accepted; only requests older than `tolerance_ms`
/// are rejected. Zero is a valid amount and a valid (stale) timestamp.
pub fn validate_request(
    request: &OperationRequest,
    now: Timestamp,
    tolerance_ms: u64,
) -> Result<ValidatedRequest, CommonError> {
    if let Some(occurred_at) = request.occurred_at {
        if occurred_at.saturating_add(tolerance_ms) < now {
            return Err(CommonError::StaleTimestamp {
                occurred_at,
                now,
                tolerance_ms,
            });
        }
    }

    let missing = |field| CommonError::MissingField { field };
    if request.plan_id.is_empty() {
        return Err(missing("planId"));
    }
    if request.beneficiary_id.is_empty() {
        return Err(missing("beneficiaryId"));
    }
    let amount = request.amount.ok_or_else(|| missing("amount"))?;
    if request.source_org.is_empty() {
        return Err(missing("sourceOrg"));
    }
    if request.stage.is_empty() {
        return Err(missing("stage"));
    }
    let occurred_at = request.occurred_at.ok_or_else(|| missing("occurredAt"))?;

    let stage = Stage::from_code(&request.stage)
        .ok_or_else(|| CommonError::UnknownStage(request.stage.clone()))?;

    if stage.requires_target_org() && request.target_org.is_empty() {
        return Err(CommonError::MissingTargetOrg);
    }

    let donor_identifier = if stage.requires_donor_identifier() {
        if request.donor_identifier.is_empty() {
            return Err(CommonError::MissingDonorIdentifier);
        }
        if !is_valid_national_id(request.donor_identifier.as_str()) {
            return Err(CommonError::InvalidDonorChecksum);
        }
        Some(request.donor_identifier.clone())
    } else {
        None
    };

    Ok(ValidatedRequest {
        plan_id: request.plan_id.clone(),
        beneficiary_id: request.beneficiary_id.clone(),
        amount,
        occurred_at,
        source_org: request.source_org.clone(),
        target_org: request.target_org.clone(),
        stage,
        donor_identifier,
    })
}

/// Weighted mod-11 check on a 10-digit national identifier.
///
/// The first nine digits are weighted 10 down to 2. With `r` the weighted
/// sum mod 11, the tenth digit must equal `r` when `r < 2` and `11 - r`
/// otherwise. Identifiers made of a single repeated digit are rejected.
#[must_use]
pub fn is_valid_national_id(code: &str) -> bool {
    if code.len() != NATIONAL_ID_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let digits: Vec<u32> = code.bytes().map(|b| u32::from(b - b'0')).collect();
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check = digits[9];
    let weighted: u32 = digits[..9]
        .iter()
        .zip((2..=10).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let remainder = weighted % 11;

    if remainder < 2 {
        check == remainder
    } else {
        check == 11 - remainder
    }
}
