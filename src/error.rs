use thiserror::Error;

#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::PyErr;

/// Malformed matrix shapes, rejected before any row operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("Matrix has no rows")]
    NoRows,

    #[error("Matrix has no columns")]
    NoColumns,

    #[error("Row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Matrix holds {found} cells, expected {expected}")]
    CellCount { expected: usize, found: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("Invalid matrix shape: {0}")]
    Shape(#[from] ShapeError),

    #[error("Non-finite value {value} at ({row}, {col})")]
    InvalidValue { row: usize, col: usize, value: f64 },

    #[error("Dimensions not compatible for {op}: {left:?} and {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("Matrix is not square ({rows}x{cols})")]
    NotSquare { rows: usize, cols: usize },

    #[error("Matrix is singular")]
    Singular,

    #[error("Expected {expected} free parameters, got {found}")]
    ParameterCount { expected: usize, found: usize },

    #[error("Epsilon must be finite and non-negative, got {0}")]
    InvalidEpsilon(f64),
}

impl MatrixError {
    pub fn is_shape_error(&self) -> bool {
        matches!(self, MatrixError::Shape(_))
    }
}

#[cfg(feature = "python")]
impl From<MatrixError> for PyErr {
    fn from(err: MatrixError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
