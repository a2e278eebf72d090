//! Error types for the feasibility engine

use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, FeasibilityError>;

/// Errors produced while validating inputs or deriving metrics
#[derive(Debug, Error)]
pub enum FeasibilityError {
    /// Out-of-range or inconsistent input (e.g. min cost above max cost)
    #[error("invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },

    /// Projection configuration outside the supported range
    #[error("invalid projection config: {message}")]
    InvalidConfig { message: String },

    /// IRR root-finder found no bracket or exhausted its iteration cap
    #[error("IRR did not converge: {reason}")]
    NonConvergentIrr { reason: String },

    /// Cumulative cash flow never turns non-negative within the horizon
    #[error("cash flow does not recover within {horizon_years} years")]
    UndefinedPayback { horizon_years: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FeasibilityError {
    pub fn invalid_parameter(field: impl Into<String>, message: impl Into<String>) -> Self {
        FeasibilityError::InvalidParameter {
            field: field.into(),
            message: message.into(),
        }
    }
}
