use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommissionError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Over-allocation on deal {deal_id}: percentages sum to {sum}% (limit 100%)")]
    OverAllocation { deal_id: String, sum: Decimal },

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CommissionError {
    fn from(e: serde_json::Error) -> Self {
        CommissionError::SerializationError(e.to_string())
    }
}

impl From<serde_yaml::Error> for CommissionError {
    fn from(e: serde_yaml::Error) -> Self {
        CommissionError::Config(e.to_string())
    }
}

impl From<csv::Error> for CommissionError {
    fn from(e: csv::Error) -> Self {
        CommissionError::Csv(e.to_string())
    }
}
