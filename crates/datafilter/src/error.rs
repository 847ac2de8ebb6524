//! Error types for the datafilter crate.

use thiserror::Error;

/// Errors raised while evaluating conditions.
///
/// Unknown operators, type mismatches and malformed record collections never
/// produce an error; they evaluate to `false` or an empty result. Only a
/// predicate that cannot run at all reports one.
#[derive(Debug, Error)]
pub enum FilterError {
    /// A `matches`/`regexp` condition value is not a valid pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A user-supplied predicate reported a failure.
    #[error("predicate '{operator}' failed: {message}")]
    Predicate { operator: String, message: String },
}

impl FilterError {
    /// Builds a [`FilterError::Predicate`] for a named operator.
    pub fn predicate(operator: impl Into<String>, message: impl Into<String>) -> Self {
        FilterError::Predicate {
            operator: operator.into(),
            message: message.into(),
        }
    }
}

/// Result type for datafilter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
