use crate::error::MatrixError;
use crate::matrix::matrix_real::RealElement;
use crate::reducer::reducer_config::ReducerConfig;
use crate::reducer::reduction::{ReductionResult, RowOperation};

pub trait Matrix<T>
where
    Self: Sized,
    T: RealElement,
{
    fn from_list(lines: Vec<Vec<T>>) -> Result<Self, MatrixError>;
    fn to_list(&self) -> Vec<Vec<T>>;

    fn is_rref(&self, tolerance: T) -> bool;
    fn rref(&self, config: &ReducerConfig) -> Result<ReductionResult<T>, MatrixError>;
    fn rank(&self, config: &ReducerConfig) -> Result<usize, MatrixError> {
        Ok(self.rref(config)?.rank())
    }
    fn right_kernel_matrix(&self, config: &ReducerConfig) -> Result<Self, MatrixError>;
    fn identity(n: usize) -> Self;
    fn inverse(&self, config: &ReducerConfig) -> Result<Self, MatrixError>;
    fn transpose(&self) -> Self;
    fn at(&self, row: usize, col: usize) -> T;

    fn swap_rows(&mut self, a: usize, b: usize);
    fn scale_row(&mut self, row: usize, factor: T);
    fn add_row_multiple(&mut self, target: usize, source: usize, factor: T);
    fn apply(&mut self, operation: &RowOperation<T>) {
        match *operation {
            RowOperation::Swap { a, b } => self.swap_rows(a, b),
            RowOperation::Scale { row, factor } => self.scale_row(row, factor),
            RowOperation::AddMultiple {
                target,
                source,
                factor,
            } => self.add_row_multiple(target, source, factor),
        }
    }
}
