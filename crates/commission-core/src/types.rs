use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Monetary amounts. Decimal, never f64.
pub type Money = Decimal;

/// Percentages on the canonical 0-100 scale (30 = 30%).
pub type Percent = Decimal;

/// Opaque deal identifier
pub type DealId = String;

/// Opaque team identifier
pub type TeamId = String;

/// Envelope every entry point returns: the result plus how it was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    /// Inputs and policy the result depends on
    pub assumptions: serde_json::Value,
    /// Non-fatal findings, e.g. over-allocated deals admitted under lenient policy
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Wrap `result` in an envelope, timing from `started`.
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: serde_json::Value,
    warnings: Vec<String>,
    started: Instant,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions,
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: started.elapsed().as_micros() as u64,
            precision: "rust_decimal_128bit, money rounded to 2dp".to_string(),
        },
    }
}
