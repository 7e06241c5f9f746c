//! Error types for design influence analysis

use thiserror::Error;

/// Result type alias for analysis operations
pub type Result<T> = std::result::Result<T, InfluenceError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum InfluenceError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Label mismatch for {matrix}: {labels} labels for {columns} columns")]
    LabelMismatch {
        matrix: &'static str,
        labels: usize,
        columns: usize,
    },

    #[error("Column '{column}' of the {matrix} matrix has zero variance")]
    DegenerateColumn {
        matrix: &'static str,
        column: String,
    },

    #[error("Insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("No analysis has been run yet: {0}")]
    NotComputed(String),

    #[error("Nothing to display: run the random forest or Lasso analysis first")]
    NothingToDisplay,

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for InfluenceError {
    fn from(err: polars::error::PolarsError) -> Self {
        InfluenceError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for InfluenceError {
    fn from(err: serde_json::Error) -> Self {
        InfluenceError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InfluenceError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_degenerate_column_display() {
        let err = InfluenceError::DegenerateColumn {
            matrix: "design",
            column: "cross_length".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Column 'cross_length' of the design matrix has zero variance"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: InfluenceError = io_err.into();
        assert!(matches!(err, InfluenceError::IoError(_)));
    }
}
