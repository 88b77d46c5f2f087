//! Typed domain errors.
//!
//! Services return `anyhow::Result`; the REST layer downcasts to these types
//! to choose a status code.

use crate::domain::money::Money;

/// Failures raised by the split allocator. All of them are caller mistakes
/// that need human correction; rounding drift is never reported here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitError {
    /// Structurally impossible input (no participants, nothing to proportion tax over, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// An aggregate constraint is violated (percentages not adding up to 100, all-zero shares)
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Custom amounts do not add up to the bill total
    #[error("Amounts add up to {actual} but the bill total is {expected}")]
    Mismatch { expected: Money, actual: Money },
}

impl SplitError {
    pub fn kind(&self) -> &'static str {
        match self {
            SplitError::InvalidInput(_) => "invalid_input",
            SplitError::Validation(_) => "validation",
            SplitError::Mismatch { .. } => "mismatch",
        }
    }
}

/// A stored or received payload did not have the expected shape.
#[derive(Debug, thiserror::Error)]
#[error("Could not decode {what}: {reason}")]
pub struct DeserializationError {
    pub what: String,
    pub reason: String,
}

impl DeserializationError {
    pub fn new(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BillError {
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("Description cannot be empty")]
    EmptyDescription,
    #[error("Description is too long ({0} characters). Maximum is {1}.")]
    DescriptionTooLong(usize, usize),
    #[error("Payer cannot be empty")]
    EmptyPayer,
    #[error("Bill total is too large. Maximum is {0}")]
    AmountTooLarge(Money),
    #[error("Bill not found: {0}")]
    NotFound(String),
    #[error("{member_id} has no share on bill {bill_id}")]
    ShareNotFound { bill_id: String, member_id: String },
    #[error("Only the payer or the member can settle this share")]
    Forbidden,
    #[error("Share for {0} is already settled")]
    AlreadySettled(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_shows_both_amounts() {
        let error = SplitError::Mismatch {
            expected: Money::from_cents(1000),
            actual: Money::from_cents(995),
        };

        assert_eq!(error.to_string(), "Amounts add up to 9.95 but the bill total is 10.00");
        assert_eq!(error.kind(), "mismatch");
    }

    #[test]
    fn test_bill_error_wraps_split_error_transparently() {
        let error: BillError = SplitError::Validation("Percentages must add up to 100".to_string()).into();

        assert_eq!(error.to_string(), "Validation failed: Percentages must add up to 100");
    }
}
