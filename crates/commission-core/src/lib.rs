pub mod error;
pub mod types;

#[cfg(feature = "commission")]
pub mod commission;

pub use error::CommissionError;
pub use types::*;

/// Standard result type for all commission operations
pub type CommissionResult<T> = Result<T, CommissionError>;
