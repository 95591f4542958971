//! Error types shared by all snake solvers.

use thiserror::Error;

/// Errors raised by solver construction, configuration and stepping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnakeError {
    /// The embedding array has a rank other than 2 or 3.
    #[error("invalid number of dimensions: {0} (should be 2 or 3)")]
    InvalidRank(usize),

    /// Level set and data arrays do not share the same shape.
    #[error("shape mismatch: level set is {levelset:?} but data is {data:?}")]
    ShapeMismatch {
        levelset: Vec<usize>,
        data: Vec<usize>,
    },

    /// One side of the ACWE partition is empty, so its mean is undefined.
    #[error("the {0} region is empty; its mean is undefined")]
    EmptyRegion(&'static str),

    /// A seed center does not provide one coordinate per domain axis.
    #[error("center has {found} coordinates but the domain has {expected} axes")]
    CenterDimensions { expected: usize, found: usize },

    /// A per-label parameter list has a length other than 1 or N.
    #[error("expected 1 or {expected} solver configurations, got {found}")]
    ParameterCount { expected: usize, found: usize },

    /// The multi-region init mask contains no positive labels.
    #[error("the init mask contains no positive labels")]
    EmptyMask,
}

pub type Result<T> = std::result::Result<T, SnakeError>;

#[cfg(feature = "python")]
impl From<SnakeError> for pyo3::PyErr {
    fn from(err: SnakeError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
