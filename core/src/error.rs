use thiserror::Error;

/// Errors that block plan generation.
///
/// Everything else the planner runs into (unknown sex spelling, missing
/// macros, no realizable recipe) degrades into a [`crate::models::Diagnostic`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("missing biometric data: {field} must be a positive number (got {value:?})")]
    MissingBiometricData {
        field: &'static str,
        value: Option<f64>,
    },

    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
