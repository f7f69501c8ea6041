use itertools::Itertools;
use num_traits::Float;
use rayon::prelude::*;
use std::fmt;
use std::ops;
use std::ops::Range;

use crate::error::{MatrixError, ShapeError};
use crate::matrix::matrix::Matrix;
use crate::reducer::reducer::MatrixReducer;
use crate::reducer::reducer_config::ReducerConfig;
use crate::reducer::reduction::ReductionResult;
use crate::reducer::solution::null_space_basis;
use crate::utils::{approx_eq, is_negligible};

pub trait RealElement:  // Avoid repeating all the traits
    Float
    + fmt::Display
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
}

impl<T> RealElement for T where T: Float + fmt::Display + fmt::Debug + Send + Sync + 'static {}

/// Dense row-major matrix of reals.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixReal<T = f64> {
    pub cols: usize,
    pub rows: usize,
    pub cells: Vec<T>,
}

impl<T: RealElement> Matrix<T> for MatrixReal<T> {
    fn from_list(lines: Vec<Vec<T>>) -> Result<Self, MatrixError> {
        let rows = lines.len();
        let cols = lines.first().ok_or(ShapeError::NoRows)?.len();
        if cols == 0 {
            return Err(ShapeError::NoColumns.into());
        }
        if let Some((row, line)) = lines.iter().find_position(|line| line.len() != cols) {
            return Err(ShapeError::Ragged {
                row,
                expected: cols,
                found: line.len(),
            }
            .into());
        }

        let matrix = MatrixReal {
            rows,
            cols,
            cells: lines.into_iter().flatten().collect(),
        };
        matrix.validate()?;
        Ok(matrix)
    }

    fn to_list(&self) -> Vec<Vec<T>> {
        if self.cols == 0 {
            return vec![vec![]; self.rows];
        }
        self.cells
            .chunks(self.cols)
            .map(|line| line.into())
            .collect()
    }

    fn is_rref(&self, tolerance: T) -> bool {
        let mut last_pivot_col = None;
        let mut seen_zero_row = false;

        for row in 0..self.rows {
            let line = self.row(row);
            match line.iter().position(|x| !is_negligible(*x, tolerance)) {
                None => seen_zero_row = true,
                Some(pivot_col) => {
                    if seen_zero_row {
                        return false;
                    }
                    if let Some(last) = last_pivot_col {
                        if pivot_col <= last {
                            return false;
                        }
                    }
                    if !approx_eq(line[pivot_col], T::one(), tolerance) {
                        return false;
                    }
                    if (0..self.rows)
                        .any(|r| r != row && !is_negligible(self.at(r, pivot_col), tolerance))
                    {
                        return false;
                    }
                    last_pivot_col = Some(pivot_col);
                }
            }
        }
        true
    }

    fn rref(&self, config: &ReducerConfig) -> Result<ReductionResult<T>, MatrixError> {
        MatrixReducer::new(*config).reduce(self)
    }

    fn right_kernel_matrix(&self, config: &ReducerConfig) -> Result<MatrixReal<T>, MatrixError> {
        let reduced = self.rref(config)?;
        let (_free_cols, basis) = null_space_basis(&reduced.matrix, &reduced.pivots, self.cols);

        // one basis vector per column
        Ok(MatrixReal {
            rows: self.cols,
            cols: basis.len(),
            cells: (0..self.cols)
                .flat_map(|r| basis.iter().map(move |v| v[r]))
                .collect(),
        })
    }

    fn identity(n: usize) -> MatrixReal<T> {
        MatrixReal {
            rows: n,
            cols: n,
            cells: (0..n)
                .flat_map(|i| (0..n).map(move |j| if i == j { T::one() } else { T::zero() }))
                .collect(),
        }
    }

    fn inverse(&self, config: &ReducerConfig) -> Result<MatrixReal<T>, MatrixError> {
        if self.rows != self.cols {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }

        let n = self.rows;
        let augmented = self.augment(&MatrixReal::identity(n))?;
        let reduced = MatrixReducer::new(*config).reduce_owned(augmented)?;

        if reduced.pivot_columns.iter().filter(|col| **col < n).count() != n {
            return Err(MatrixError::Singular);
        }
        Ok(reduced.matrix.columns(n..2 * n))
    }

    fn transpose(&self) -> MatrixReal<T> {
        MatrixReal {
            rows: self.cols,
            cols: self.rows,
            cells: (0..self.cols)
                .flat_map(|c| (0..self.rows).map(move |r| self.at(r, c)))
                .collect(),
        }
    }

    #[inline(always)]
    fn at(&self, row: usize, col: usize) -> T {
        self.cells[row * self.cols + col]
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for k in 0..self.cols {
            self.cells.swap(a * self.cols + k, b * self.cols + k);
        }
    }

    fn scale_row(&mut self, row: usize, factor: T) {
        self.row_mut(row).iter_mut().for_each(|x| *x = *x * factor);
    }

    fn add_row_multiple(&mut self, target: usize, source: usize, factor: T) {
        if target == source {
            return self.scale_row(target, T::one() + factor);
        }
        for k in 0..self.cols {
            let value = self.cells[source * self.cols + k];
            let cell = &mut self.cells[target * self.cols + k];
            *cell = *cell + factor * value;
        }
    }
}

impl<T: RealElement> MatrixReal<T> {
    pub fn zeros(rows: usize, cols: usize) -> MatrixReal<T> {
        MatrixReal {
            rows,
            cols,
            cells: vec![T::zero(); rows * cols],
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        &mut self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Checks that the matrix is non-empty, consistent, and finite.
    /// Shape problems are reported before non-finite values.
    pub fn validate(&self) -> Result<(), MatrixError> {
        if self.rows == 0 {
            return Err(ShapeError::NoRows.into());
        }
        if self.cols == 0 {
            return Err(ShapeError::NoColumns.into());
        }
        if self.cells.len() != self.rows * self.cols {
            return Err(ShapeError::CellCount {
                expected: self.rows * self.cols,
                found: self.cells.len(),
            }
            .into());
        }
        if let Some(idx) = self.cells.iter().position(|x| !x.is_finite()) {
            return Err(MatrixError::InvalidValue {
                row: idx / self.cols,
                col: idx % self.cols,
                value: self.cells[idx].to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(())
    }

    /// `[self | other]`
    pub fn augment(&self, other: &MatrixReal<T>) -> Result<MatrixReal<T>, MatrixError> {
        if self.rows != other.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "augment",
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }

        Ok(MatrixReal {
            rows: self.rows,
            cols: self.cols + other.cols,
            cells: (0..self.rows)
                .flat_map(|r| self.row(r).iter().chain(other.row(r).iter()).copied())
                .collect(),
        })
    }

    pub fn columns(&self, range: Range<usize>) -> MatrixReal<T> {
        MatrixReal {
            rows: self.rows,
            cols: range.len(),
            cells: (0..self.rows)
                .flat_map(|r| self.row(r)[range.clone()].iter().copied())
                .collect(),
        }
    }
}

impl<T: RealElement> ops::Add<&MatrixReal<T>> for &MatrixReal<T> {
    type Output = Result<MatrixReal<T>, MatrixError>;

    fn add(self, rhs: &MatrixReal<T>) -> Result<MatrixReal<T>, MatrixError> {
        if self.cols != rhs.cols || self.rows != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "add",
                left: (self.rows, self.cols),
                right: (rhs.rows, rhs.cols),
            });
        }

        Ok(MatrixReal {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .zip(rhs.cells.iter())
                .map(|(a, b)| *a + *b)
                .collect(),
        })
    }
}

impl<T: RealElement> ops::Mul<&MatrixReal<T>> for &MatrixReal<T> {
    type Output = Result<MatrixReal<T>, MatrixError>;

    fn mul(self, rhs: &MatrixReal<T>) -> Result<MatrixReal<T>, MatrixError> {
        if self.cols != rhs.rows {
            return Err(MatrixError::DimensionMismatch {
                op: "mul",
                left: (self.rows, self.cols),
                right: (rhs.rows, rhs.cols),
            });
        }

        let mut result: MatrixReal<T> = MatrixReal::zeros(self.rows, rhs.cols);
        if rhs.cols == 0 {
            return Ok(result);
        }

        let rot = rhs.transpose();

        result
            .cells
            .par_chunks_mut(rhs.cols)
            .enumerate()
            .for_each(|(r, row)| {
                let lhs = self.row(r);
                for (c, cell) in row.iter_mut().enumerate() {
                    *cell = lhs
                        .iter()
                        .zip(rot.row(c).iter())
                        .fold(T::zero(), |acc, (a, b)| acc + *a * *b);
                }
            });

        Ok(result)
    }
}

impl<T: RealElement> fmt::Display for MatrixReal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = (0..self.rows)
            .map(|r| format!("[{}]", self.row(r).iter().join(", ")))
            .join("\n");
        f.write_str(&text)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
