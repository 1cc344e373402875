//! Error types for model operations.

use thiserror::Error;

/// Errors raised by the constants layer, the step engine and the lifecycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid model variant {variant}: expected 1, 2, 3 or 4")]
    InvalidModelVariant { variant: f64 },

    #[error("Unknown parameter: {name}")]
    UnknownParameter { name: String },

    #[error("Parameter {name} is not set")]
    MissingParameter { name: &'static str },

    #[error("Parameter {name} = {value} outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Subject parameters changed since initialize; re-initialize the run")]
    StaleSubjectParameters,

    #[error("Simulation is not initialized")]
    NotInitialized,

    #[error("Convergence failed: {what} after {iterations} iterations (residual {residual})")]
    ConvergenceFailed {
        what: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("Core error: {0}")]
    Core(#[from] phs_core::CoreError),
}

pub type ModelResult<T> = Result<T, ModelError>;
