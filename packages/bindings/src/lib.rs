use napi::Result as NapiResult;
use napi_derive::napi;

use commission_core::commission::service::{
    self, AllocationInput, BreakdownInput, CommissionReportInput, ValidationInput,
};
use commission_core::commission::{aggregate, breakdown_to_csv, deal_breakdown, to_csv};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Validation and allocation
// ---------------------------------------------------------------------------

#[napi]
pub fn validate_allocations(input_json: String) -> NapiResult<String> {
    let input: ValidationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = service::run_validation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn allocate_deal(input_json: String) -> NapiResult<String> {
    let input: AllocationInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = service::run_allocation(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

#[napi]
pub fn commission_report(input_json: String) -> NapiResult<String> {
    let input: CommissionReportInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = service::run_commission_report(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// `Name,Total Commission` export for a portfolio.
#[napi]
pub fn commission_csv(input_json: String) -> NapiResult<String> {
    let input: CommissionReportInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (deals, _warnings) =
        service::ingest_deals(&input.deals, &input.policy).map_err(to_napi_error)?;
    to_csv(&aggregate(&deals, input.policy.rounding)).map_err(to_napi_error)
}

#[napi]
pub fn deal_breakdown_csv(input_json: String) -> NapiResult<String> {
    let input: BreakdownInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let (deals, _warnings) =
        service::ingest_deals(&input.deals, &input.policy).map_err(to_napi_error)?;
    let breakdown = deal_breakdown(&deals, input.columns, input.policy.rounding);
    breakdown_to_csv(&breakdown).map_err(to_napi_error)
}
