//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum TouchdownError {
    /// Landing thresholds are inconsistent.
    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Fuel capacity or depletion rate is not usable.
    #[error("Invalid fuel configuration: {0}")]
    InvalidFuel(String),

    /// Step budgets or other loop parameters are not usable.
    #[error("Invalid loop configuration: {0}")]
    InvalidLoopConfig(String),

    /// An observation vector does not have 8 elements.
    #[error("Observation must have 8 elements, got {0}")]
    ObservationShape(usize),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
