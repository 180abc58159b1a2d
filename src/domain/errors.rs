//! Domain errors for the pi calculator.

use thiserror::Error;

/// Errors raised by the computation engine before or during a run.
///
/// Cancellation is not an error; it is reported as
/// [`Outcome::Cancelled`](crate::domain::models::Outcome::Cancelled).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid digit count: {0}. Must be a positive integer")]
    InvalidDigitCount(i64),

    #[error("Invalid precision: {0}. Must carry at least one significant digit")]
    InvalidPrecision(u64),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Division by zero")]
    DivisionByZero,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Validate a requested digit count coming from user input.
///
/// The count is accepted signed so that negative input reaches this check
/// instead of failing earlier as a parse error.
pub fn validate_digit_count(requested: i64) -> EngineResult<u64> {
    u64::try_from(requested)
        .ok()
        .filter(|digits| *digits >= 1)
        .ok_or(EngineError::InvalidDigitCount(requested))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_digit_count() {
        assert_eq!(validate_digit_count(1), Ok(1));
        assert_eq!(validate_digit_count(10_000), Ok(10_000));
        assert_eq!(
            validate_digit_count(0),
            Err(EngineError::InvalidDigitCount(0))
        );
        assert_eq!(
            validate_digit_count(-5),
            Err(EngineError::InvalidDigitCount(-5))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EngineError::InvalidDigitCount(0).to_string(),
            "Invalid digit count: 0. Must be a positive integer"
        );
    }
}
