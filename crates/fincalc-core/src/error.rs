use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalcError {
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: String, reason: String },

    #[error("Non-convergent: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    NonConvergent {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalcError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CalcError::InvalidParameter {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::Serialization(e.to_string())
    }
}
