use thiserror::Error;

/// Filtering error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// A matrix operand has rows/columns incompatible with the operation
    /// being attempted. Not recoverable; reconstruct the filter with
    /// consistent dimensions.
    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    /// The innovation covariance `S` could not be inverted, so no Kalman
    /// gain exists for this step. The filter state is left untouched; the
    /// caller may retry with adjusted noise parameters or skip the
    /// measurement.
    #[error("innovation covariance is singular")]
    SingularInnovationCovariance,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl FilterError {
    /// Shorthand for a `DimensionMismatch` over `(rows, cols)` shapes.
    pub(crate) fn shape(
        what: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    ) -> Self {
        FilterError::DimensionMismatch {
            what,
            expected: format!("{}x{}", expected.0, expected.1),
            actual: format!("{}x{}", actual.0, actual.1),
        }
    }
}

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;
