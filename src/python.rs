use pyo3::prelude::*;

use crate::matrix::matrix::Matrix;
use crate::matrix::matrix_real::MatrixReal;
use crate::reducer::reducer::MatrixReducer;
use crate::reducer::reducer_config::{ReducerConfig, Tolerance};
use crate::reducer::reduction::ReductionResult;

fn config(epsilon: f64, relative: bool, record_steps: bool) -> ReducerConfig {
    ReducerConfig::new()
        .with_epsilon(epsilon)
        .with_tolerance(if relative {
            Tolerance::Relative
        } else {
            Tolerance::Absolute
        })
        .with_steps(record_steps)
}

#[pyclass(frozen, name = "Reduction")]
pub struct PyReduction {
    inner: ReductionResult<f64>,
}

#[pymethods]
impl PyReduction {
    #[getter]
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.inner.matrix.to_list()
    }

    #[getter]
    pub fn pivot_columns(&self) -> Vec<usize> {
        self.inner.pivot_columns.clone()
    }

    #[getter]
    pub fn classification(&self) -> Option<&'static str> {
        self.inner.classification.map(|c| c.as_str())
    }

    #[getter]
    pub fn rank(&self) -> usize {
        self.inner.rank()
    }

    #[getter]
    pub fn free_variables(&self) -> Vec<usize> {
        self.inner.free_variables()
    }

    #[getter]
    pub fn tolerance(&self) -> f64 {
        self.inner.tolerance
    }

    #[getter]
    pub fn steps(&self) -> Option<Vec<String>> {
        self.inner
            .steps
            .as_ref()
            .map(|steps| steps.iter().map(|s| s.to_string()).collect())
    }

    // (particular, free_variables, null_space)
    pub fn solution(&self) -> Option<(Vec<f64>, Vec<usize>, Vec<Vec<f64>>)> {
        self.inner
            .solution()
            .map(|s| (s.particular, s.free_variables, s.null_space))
    }

    pub fn __repr__(&self) -> String {
        format!(
            "Reduction(rank={}, classification={})",
            self.inner.rank(),
            self.classification().unwrap_or("None")
        )
    }

    pub fn __str__(&self) -> String {
        self.inner.matrix.to_string()
    }
}

#[pyfunction]
#[pyo3(signature = (rows, epsilon=1e-10, relative=true, record_steps=false))]
pub fn reduce(
    rows: Vec<Vec<f64>>,
    epsilon: f64,
    relative: bool,
    record_steps: bool,
) -> PyResult<PyReduction> {
    let inner = MatrixReducer::new(config(epsilon, relative, record_steps)).reduce_list(rows)?;
    Ok(PyReduction { inner })
}

#[pyfunction]
#[pyo3(signature = (rows, epsilon=1e-10, relative=true))]
pub fn inverse(rows: Vec<Vec<f64>>, epsilon: f64, relative: bool) -> PyResult<Vec<Vec<f64>>> {
    let matrix = MatrixReal::from_list(rows)?;
    Ok(matrix.inverse(&config(epsilon, relative, false))?.to_list())
}

#[pyfunction]
#[pyo3(signature = (rows, tolerance=1e-10))]
pub fn is_rref(rows: Vec<Vec<f64>>, tolerance: f64) -> PyResult<bool> {
    Ok(MatrixReal::from_list(rows)?.is_rref(tolerance))
}
