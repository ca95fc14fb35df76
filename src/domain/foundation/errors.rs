//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: u32,
        max: u32,
        actual: u32,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: u32, max: u32, actual: u32) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_names_the_field() {
        let err = ValidationError::empty_field("topic_id");
        assert_eq!(err.to_string(), "Field 'topic_id' cannot be empty");
    }

    #[test]
    fn out_of_range_reports_bounds() {
        let err = ValidationError::out_of_range("max_turns", 1, 10, 0);
        assert!(err.to_string().contains("between 1 and 10, got 0"));
    }

    #[test]
    fn invalid_format_carries_reason() {
        let err = ValidationError::invalid_format("min_turns", "must not exceed max_turns");
        assert!(err.to_string().contains("must not exceed max_turns"));
    }
}
