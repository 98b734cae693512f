use thiserror::Error;

/// Caller-level failures. Missing business data is never one of these:
/// reconciliation returns `None` and evaluation returns a zeroed
/// valuation instead, since absent fundamentals are a routine condition.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}
