use crate::error::MatrixError;
use crate::matrix::matrix::Matrix;
use crate::matrix::matrix_real::{MatrixReal, RealElement};
use crate::reducer::reduction::{PivotInfo, ReductionResult, SystemClassification};

/// Free columns among the first `variables` columns of a reduced matrix, and
/// one null space direction per free column.
pub fn null_space_basis<T: RealElement>(
    matrix: &MatrixReal<T>,
    pivots: &[PivotInfo],
    variables: usize,
) -> (Vec<usize>, Vec<Vec<T>>) {
    let mut pivot_row_for_col = vec![None; variables];
    for pivot in pivots.iter().filter(|p| p.col < variables) {
        pivot_row_for_col[pivot.col] = Some(pivot.row);
    }

    let free_cols: Vec<usize> = (0..variables)
        .filter(|&c| pivot_row_for_col[c].is_none())
        .collect();

    let basis = free_cols
        .iter()
        .map(|&free_col| {
            let mut direction = vec![T::zero(); variables];
            direction[free_col] = T::one();
            for pivot in pivots.iter().filter(|p| p.col < variables) {
                direction[pivot.col] = T::zero() - matrix.at(pivot.row, free_col);
            }
            direction
        })
        .collect();

    (free_cols, basis)
}

/// Solution set `particular + span(null_space)` of a consistent augmented system.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<T> {
    pub particular: Vec<T>,
    pub free_variables: Vec<usize>,
    pub null_space: Vec<Vec<T>>,
}

impl<T: RealElement> Solution<T> {
    /// `None` for inconsistent systems and for matrices too narrow to be augmented.
    pub fn from_reduction(result: &ReductionResult<T>) -> Option<Solution<T>> {
        if result.classification? == SystemClassification::Inconsistent {
            return None;
        }

        let matrix = &result.matrix;
        let variables = matrix.cols - 1;

        let mut particular = vec![T::zero(); variables];
        for pivot in &result.pivots {
            particular[pivot.col] = matrix.at(pivot.row, variables);
        }

        let (free_variables, null_space) = null_space_basis(matrix, &result.pivots, variables);

        Some(Solution {
            particular,
            free_variables,
            null_space,
        })
    }

    pub fn is_unique(&self) -> bool {
        self.free_variables.is_empty()
    }

    /// Point of the solution set with `params[k]` assigned to the k-th free variable.
    pub fn evaluate(&self, params: &[T]) -> Result<Vec<T>, MatrixError> {
        if params.len() != self.null_space.len() {
            return Err(MatrixError::ParameterCount {
                expected: self.null_space.len(),
                found: params.len(),
            });
        }

        Ok(self
            .null_space
            .iter()
            .zip(params.iter())
            .fold(self.particular.clone(), |mut acc, (direction, t)| {
                acc.iter_mut()
                    .zip(direction.iter())
                    .for_each(|(x, d)| *x = *x + *t * *d);
                acc
            }))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
