//! Error types for the planning core.

use thiserror::Error;

/// Failures the planning core can surface. The core never swallows these;
/// the CLI layer decides whether to notify, skip the cycle, or abort.
#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    /// Malformed or out-of-domain input: non-positive prices, unordered
    /// series, non-positive configured amounts.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Historical series too short to compute a sample standard deviation.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Year/month outside the representable calendar range.
    #[error("invalid date: year {year}, month {month}")]
    InvalidDate { year: i32, month: u32 },
}
