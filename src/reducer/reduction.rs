use std::fmt;

use crate::matrix::matrix_real::{MatrixReal, RealElement};
use crate::reducer::solution::Solution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PivotInfo {
    pub row: usize,
    pub col: usize,
}

/// Solvability of a reduced augmented system `[A | b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemClassification {
    Unique,
    Infinite,
    Inconsistent,
}

impl SystemClassification {
    /// Classifies an augmented matrix with `cols` columns (`cols - 1` variables)
    /// from its increasing pivot columns. `None` below two columns.
    pub fn from_pivots(pivot_columns: &[usize], cols: usize) -> Option<Self> {
        if cols < 2 {
            return None;
        }
        let variables = cols - 1;

        Some(if pivot_columns.last() == Some(&variables) {
            SystemClassification::Inconsistent
        } else if pivot_columns.len() == variables {
            SystemClassification::Unique
        } else {
            SystemClassification::Infinite
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SystemClassification::Unique => "unique",
            SystemClassification::Infinite => "infinite",
            SystemClassification::Inconsistent => "inconsistent",
        }
    }
}

impl fmt::Display for SystemClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Elementary row operation, as performed during a reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowOperation<T> {
    Swap { a: usize, b: usize },
    Scale { row: usize, factor: T },
    // target += factor * source
    AddMultiple { target: usize, source: usize, factor: T },
}

// rows are printed 1-based, the way calculators label them
impl<T: RealElement> fmt::Display for RowOperation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowOperation::Swap { a, b } => write!(f, "R{} <-> R{}", a + 1, b + 1),
            RowOperation::Scale { row, factor } => {
                write!(f, "R{} -> {} * R{}", row + 1, factor, row + 1)
            }
            RowOperation::AddMultiple {
                target,
                source,
                factor,
            } => {
                if *factor < T::zero() {
                    write!(
                        f,
                        "R{} -> R{} - {} * R{}",
                        target + 1,
                        target + 1,
                        -*factor,
                        source + 1
                    )
                } else {
                    write!(
                        f,
                        "R{} -> R{} + {} * R{}",
                        target + 1,
                        target + 1,
                        factor,
                        source + 1
                    )
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReductionResult<T> {
    /// The RREF, same shape as the input.
    pub matrix: MatrixReal<T>,
    /// Increasing.
    pub pivot_columns: Vec<usize>,
    pub pivots: Vec<PivotInfo>,
    pub classification: Option<SystemClassification>,
    /// Zero threshold the reduction ran with.
    pub tolerance: T,
    /// Row operations in execution order, when recording was enabled.
    pub steps: Option<Vec<RowOperation<T>>>,
}

impl<T: RealElement> ReductionResult<T> {
    pub fn rank(&self) -> usize {
        self.pivot_columns.len()
    }

    pub fn is_pivot_column(&self, col: usize) -> bool {
        self.pivot_columns.binary_search(&col).is_ok()
    }

    /// Non-pivot columns among the first `variables` columns.
    pub fn free_columns(&self, variables: usize) -> Vec<usize> {
        (0..variables.min(self.matrix.cols))
            .filter(|col| !self.is_pivot_column(*col))
            .collect()
    }

    /// Free variables of the augmented system, empty for a single column matrix.
    pub fn free_variables(&self) -> Vec<usize> {
        if self.matrix.cols < 2 {
            return vec![];
        }
        self.free_columns(self.matrix.cols - 1)
    }

    pub fn solution(&self) -> Option<Solution<T>> {
        Solution::from_reduction(self)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
