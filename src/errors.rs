//! Error types and validation functions for cycle analysis.
//!
//! This module provides the error taxonomy shared by every analysis component:
//! malformed input, too little history for a given method, and numerically
//! degenerate computations (undefined logarithms or divisions).

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error types for cycle analysis operations.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum CycleAnalysisError {
    /// Malformed or out-of-domain input data.
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// What was wrong with the input
        reason: String,
    },

    /// Fewer observations than the component requires.
    #[error("Insufficient data for {context}: need at least {required} points, got {actual}")]
    InsufficientData {
        /// Component or operation that rejected the data
        context: String,
        /// Minimum required data points
        required: usize,
        /// Actual number of data points provided
        actual: usize,
    },

    /// Undefined logarithm, division or otherwise degenerate numeric input.
    #[error("Numerically degenerate {operation}: {reason}")]
    NumericDegenerate {
        /// Operation that could not be evaluated
        operation: String,
        /// Detailed reason
        reason: String,
    },
}

/// Coarse error classification used when recording component failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ErrorCategory {
    /// See [`CycleAnalysisError::InvalidInput`]
    InvalidInput,
    /// See [`CycleAnalysisError::InsufficientData`]
    InsufficientData,
    /// See [`CycleAnalysisError::NumericDegenerate`]
    NumericDegenerate,
}

impl CycleAnalysisError {
    /// Shorthand for [`CycleAnalysisError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`CycleAnalysisError::InsufficientData`].
    pub fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            actual,
        }
    }

    /// Shorthand for [`CycleAnalysisError::NumericDegenerate`].
    pub fn degenerate(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NumericDegenerate {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::InvalidInput,
            Self::InsufficientData { .. } => ErrorCategory::InsufficientData,
            Self::NumericDegenerate { .. } => ErrorCategory::NumericDegenerate,
        }
    }
}

/// Result type for cycle analysis operations.
pub type CycleResult<T> = Result<T, CycleAnalysisError>;

/// Validates that data has sufficient length for analysis.
///
/// # Example
/// ```rust
/// use market_cycles::errors::validate_data_length;
///
/// let data = vec![1.0, 2.0, 3.0];
/// assert!(validate_data_length(&data, 2, "test").is_ok());
/// assert!(validate_data_length(&data, 5, "test").is_err());
/// ```
pub fn validate_data_length<T>(data: &[T], min_required: usize, context: &str) -> CycleResult<()> {
    if data.len() < min_required {
        Err(CycleAnalysisError::insufficient(
            context,
            min_required,
            data.len(),
        ))
    } else {
        Ok(())
    }
}

/// Validates that all values in a slice are finite.
///
/// Returns on the first non-finite value, naming its index.
///
/// # Example
/// ```rust
/// use market_cycles::errors::validate_all_finite;
///
/// assert!(validate_all_finite(&[1.0, 2.0, 3.0], "test").is_ok());
/// assert!(validate_all_finite(&[1.0, f64::NAN, 3.0], "test").is_err());
/// ```
pub fn validate_all_finite(data: &[f64], name: &str) -> CycleResult<()> {
    if let Some((i, &value)) = data.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        let value_desc = if value.is_nan() {
            "NaN".to_string()
        } else if value.is_sign_positive() {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };

        return Err(CycleAnalysisError::invalid_input(format!(
            "{} contains non-finite value at index {}: {}",
            name, i, value_desc
        )));
    }

    Ok(())
}
