#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod error;
pub mod matrix {
    pub mod matrix;
    pub mod matrix_real;
}
pub mod reducer {
    pub mod reducer;
    pub mod reducer_config;
    pub mod reduction;
    pub mod solution;
}

pub mod utils;

#[cfg(feature = "python")]
pub mod python;

pub use error::{MatrixError, ShapeError};
pub use matrix::matrix::Matrix;
pub use matrix::matrix_real::{MatrixReal, RealElement};
pub use reducer::reducer::{reduce, MatrixReducer};
pub use reducer::reducer_config::{ReducerConfig, Tolerance, DEFAULT_EPSILON};
pub use reducer::reduction::{PivotInfo, ReductionResult, RowOperation, SystemClassification};
pub use reducer::solution::Solution;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn rust_rref(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(python::reduce, m)?)?;
    m.add_function(wrap_pyfunction!(python::inverse, m)?)?;
    m.add_function(wrap_pyfunction!(python::is_rref, m)?)?;
    m.add_class::<python::PyReduction>()?;
    Ok(())
}
