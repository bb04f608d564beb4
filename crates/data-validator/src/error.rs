//! Validation Error Types

use thiserror::Error;

/// A single field constraint violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field absent or blank
    #[error("field {0} is required")]
    Required(&'static str),

    /// Field is not an email address
    #[error("field {0} must be a valid email address")]
    InvalidEmail(&'static str),

    /// Text longer than allowed
    #[error("field {field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Number below the allowed minimum
    #[error("field {field} must be at least {min}")]
    TooSmall { field: &'static str, min: i64 },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required(field) | Self::InvalidEmail(field) => field,
            Self::TooLong { field, .. } | Self::TooSmall { field, .. } => field,
        }
    }
}
