//! Error types for the Wellness Tracker shared calculations

use thiserror::Error;

/// Failures of the pure health calculations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    #[error("Height must be a positive number")]
    InvalidHeight,

    #[error("Weight must be a finite number")]
    InvalidWeight,

    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),
}
