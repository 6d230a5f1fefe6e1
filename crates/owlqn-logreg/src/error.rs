//! Error types for dataset loading and construction.

use thiserror::Error;

/// Errors raised while reading or building a [`SparseDataset`](crate::SparseDataset).
///
/// Line numbers are 1-based and count every physical line of the input,
/// including skipped blank ones.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Underlying reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Dataset file does not exist.
    #[error("Dataset file not found: {path}")]
    FileNotFound {
        /// Path that was requested
        path: String,
    },

    /// Label token is neither `0` nor `1`.
    #[error("Line {line}: illegal label '{label}', must be 1 or 0")]
    InvalidLabel {
        /// Line of the offending instance
        line: usize,
        /// Token found in label position
        label: String,
    },

    /// Malformed `index:value` pair or unparsable number.
    #[error("Line {line}: {message}")]
    InvalidFormat {
        /// Line of the offending instance
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Feature index outside `1..=num_features`.
    #[error("Line {line}: feature index {index} is outside 1..={num_features}")]
    FeatureIndexOutOfRange {
        /// Line of the offending instance (instance number for in-memory construction)
        line: usize,
        /// Offending index, 1-based
        index: usize,
        /// Declared number of features
        num_features: usize,
    },

    /// Index and value slices of an instance differ in length.
    #[error("Length mismatch: {indices} feature indices but {values} values")]
    LengthMismatch {
        /// Number of indices supplied
        indices: usize,
        /// Number of values supplied
        values: usize,
    },

    /// Regularization weight is negative or non-finite.
    #[error("Invalid regularization weight: {weight}")]
    InvalidRegularization {
        /// Offending weight
        weight: f64,
    },
}

impl DatasetError {
    /// Creates a format error for the given line.
    pub fn invalid_format<S: Into<String>>(line: usize, message: S) -> Self {
        Self::InvalidFormat {
            line,
            message: message.into(),
        }
    }

    /// Line number the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::InvalidLabel { line, .. }
            | Self::InvalidFormat { line, .. }
            | Self::FeatureIndexOutOfRange { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
