use log::{debug, trace};
use rayon::prelude::*;

use crate::error::MatrixError;
use crate::matrix::matrix::Matrix;
use crate::matrix::matrix_real::{MatrixReal, RealElement};
use crate::reducer::reducer_config::ReducerConfig;
use crate::reducer::reduction::{PivotInfo, ReductionResult, RowOperation, SystemClassification};
use crate::utils::snap;

/// Gauss-Jordan elimination to Reduced Row Echelon Form.
///
/// Columns are scanned left to right. In each column the pivot is the entry of
/// largest magnitude at or below the current pivot row, the topmost one on
/// ties. A column whose best candidate is within the tolerance has no pivot.
/// The reducer holds only its configuration, so one instance can be shared
/// freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixReducer {
    config: ReducerConfig,
}

impl MatrixReducer {
    pub fn new(config: ReducerConfig) -> Self {
        MatrixReducer { config }
    }

    pub fn config(&self) -> &ReducerConfig {
        &self.config
    }

    /// Reduces a private copy of `matrix`; the caller's matrix is left untouched.
    pub fn reduce<T: RealElement>(
        &self,
        matrix: &MatrixReal<T>,
    ) -> Result<ReductionResult<T>, MatrixError> {
        self.reduce_owned(matrix.clone())
    }

    pub fn reduce_list<T: RealElement>(
        &self,
        lines: Vec<Vec<T>>,
    ) -> Result<ReductionResult<T>, MatrixError> {
        self.reduce_owned(MatrixReal::from_list(lines)?)
    }

    /// Reduces `matrix` in place, reusing its buffer for the result.
    pub fn reduce_owned<T: RealElement>(
        &self,
        mut matrix: MatrixReal<T>,
    ) -> Result<ReductionResult<T>, MatrixError> {
        self.config.validate()?;
        matrix.validate()?;

        let (rows, cols) = (matrix.rows, matrix.cols);
        let tolerance = self.config.tolerance_for(&matrix.cells);
        debug!(
            "reducing {}x{} matrix, tolerance {}",
            rows, cols, tolerance
        );

        let mut steps = self.config.record_steps.then(Vec::new);
        let mut pivots = Vec::with_capacity(rows.min(cols));
        let mut pivot_row = 0;

        for col in 0..cols {
            if pivot_row >= rows {
                break;
            }

            let (best_row, best_abs) = select_pivot(&matrix, pivot_row, col);
            if best_abs <= tolerance {
                trace!("column {} has no pivot (best |a| = {})", col, best_abs);
                for r in pivot_row..rows {
                    matrix.cells[r * cols + col] = T::zero();
                }
                continue;
            }

            if best_row != pivot_row {
                matrix.swap_rows(best_row, pivot_row);
                record(
                    &mut steps,
                    RowOperation::Swap {
                        a: pivot_row,
                        b: best_row,
                    },
                );
            }

            let pivot = matrix.at(pivot_row, col);
            if pivot != T::one() {
                matrix
                    .row_mut(pivot_row)
                    .iter_mut()
                    .for_each(|x| *x = *x / pivot);
                record(
                    &mut steps,
                    RowOperation::Scale {
                        row: pivot_row,
                        factor: T::one() / pivot,
                    },
                );
            }
            matrix.cells[pivot_row * cols + col] = T::one();

            for r in (0..rows).filter(|r| *r != pivot_row) {
                let factor = matrix.at(r, col);
                if factor == T::zero() {
                    continue;
                }
                matrix.add_row_multiple(r, pivot_row, -factor);
                matrix.cells[r * cols + col] = T::zero();
                record(
                    &mut steps,
                    RowOperation::AddMultiple {
                        target: r,
                        source: pivot_row,
                        factor: -factor,
                    },
                );
            }

            trace!("pivot {} at ({}, {})", pivot, pivot_row, col);
            pivots.push(PivotInfo {
                row: pivot_row,
                col,
            });
            pivot_row += 1;
        }

        matrix
            .cells
            .iter_mut()
            .for_each(|x| *x = snap(*x, tolerance));
        // a tolerance of 1 or more would otherwise snap the pivots away
        for pivot in &pivots {
            matrix.cells[pivot.row * cols + pivot.col] = T::one();
        }

        let pivot_columns: Vec<usize> = pivots.iter().map(|p| p.col).collect();
        let classification = SystemClassification::from_pivots(&pivot_columns, cols);
        debug!(
            "reduced {}x{} matrix: rank {}, pivot columns {:?}, classification {:?}",
            rows,
            cols,
            pivot_columns.len(),
            pivot_columns,
            classification
        );

        Ok(ReductionResult {
            matrix,
            pivot_columns,
            pivots,
            classification,
            tolerance,
            steps,
        })
    }

    /// Reduces independent matrices in parallel. Results keep the input order.
    pub fn reduce_many<T: RealElement>(
        &self,
        matrices: &[MatrixReal<T>],
    ) -> Vec<Result<ReductionResult<T>, MatrixError>> {
        matrices.par_iter().map(|m| self.reduce(m)).collect()
    }
}

/// Row at or below `from` with the largest `|a[row][col]|`; the first one wins ties.
fn select_pivot<T: RealElement>(matrix: &MatrixReal<T>, from: usize, col: usize) -> (usize, T) {
    let mut best_row = from;
    let mut best_abs = matrix.at(from, col).abs();
    for r in from + 1..matrix.rows {
        let value = matrix.at(r, col).abs();
        if value > best_abs {
            best_row = r;
            best_abs = value;
        }
    }
    (best_row, best_abs)
}

#[inline(always)]
fn record<T>(steps: &mut Option<Vec<RowOperation<T>>>, operation: RowOperation<T>) {
    if let Some(steps) = steps {
        steps.push(operation);
    }
}

/// Reduces `lines` with the default configuration.
pub fn reduce(lines: Vec<Vec<f64>>) -> Result<ReductionResult<f64>, MatrixError> {
    MatrixReducer::default().reduce_list(lines)
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShapeError;
    use crate::reducer::reducer_config::Tolerance;
    use crate::utils::approx_eq_lists;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn random_matrix(rng: &mut StdRng) -> MatrixReal {
        let rows = rng.gen_range(1..=6);
        let cols = rng.gen_range(1..=7);
        let mut lines: Vec<Vec<f64>> = (0..rows)
            .map(|_| (0..cols).map(|_| rng.gen_range(-9..=9) as f64).collect())
            .collect();

        // make some rows dependent so low ranks show up
        if rows > 2 && rng.gen_bool(0.5) {
            let k = rng.gen_range(-3..=3) as f64;
            lines[rows - 1] = lines[0]
                .iter()
                .zip(lines[1].iter())
                .map(|(a, b)| a + k * b)
                .collect();
        }
        MatrixReal::from_list(lines).unwrap()
    }

    #[test]
    fn test_unique_system() {
        init();
        // x + 2y = 8, 3x - y = 3
        let result = reduce(vec![vec![1.0, 2.0, 8.0], vec![3.0, -1.0, 3.0]]).unwrap();
        assert!(approx_eq_lists(
            &result.matrix.to_list(),
            &[vec![1.0, 0.0, 2.0], vec![0.0, 1.0, 3.0]],
            1e-12
        ));
        assert_eq!(result.pivot_columns, vec![0, 1]);
        assert_eq!(result.classification, Some(SystemClassification::Unique));

        // x + 2y = 8, 3x - y = 9
        let result = reduce(vec![vec![1.0, 2.0, 8.0], vec![3.0, -1.0, 9.0]]).unwrap();
        assert!(approx_eq_lists(
            &result.matrix.to_list(),
            &[vec![1.0, 0.0, 26.0 / 7.0], vec![0.0, 1.0, 15.0 / 7.0]],
            1e-12
        ));
        assert_eq!(result.pivot_columns, vec![0, 1]);
        assert_eq!(result.classification, Some(SystemClassification::Unique));
    }

    #[test]
    fn test_inconsistent_system() {
        init();
        let result = reduce(vec![vec![1.0, 1.0, 2.0], vec![1.0, 1.0, 5.0]]).unwrap();
        assert_eq!(
            result.matrix.to_list(),
            vec![vec![1.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]
        );
        assert_eq!(result.pivot_columns, vec![0, 2]);
        assert_eq!(
            result.classification,
            Some(SystemClassification::Inconsistent)
        );
        assert!(result.solution().is_none());
    }

    #[test]
    fn test_infinite_system() {
        init();
        let result = reduce(vec![vec![1.0, 1.0, 2.0], vec![2.0, 2.0, 4.0]]).unwrap();
        assert_eq!(
            result.matrix.to_list(),
            vec![vec![1.0, 1.0, 2.0], vec![0.0, 0.0, 0.0]]
        );
        assert_eq!(result.pivot_columns, vec![0]);
        assert_eq!(result.pivots, vec![PivotInfo { row: 0, col: 0 }]);
        assert_eq!(result.classification, Some(SystemClassification::Infinite));
        assert_eq!(result.free_variables(), vec![1]);
    }

    #[test]
    fn test_identity_pass_through() {
        let identity = MatrixReal::<f64>::identity(3);
        let result = MatrixReducer::default().reduce(&identity).unwrap();
        assert_eq!(result.matrix, identity);
        assert_eq!(result.pivot_columns, vec![0, 1, 2]);

        let already = vec![vec![1.0, 0.0, 2.5], vec![0.0, 1.0, -3.0]];
        let result = reduce(already.clone()).unwrap();
        assert_eq!(result.matrix.to_list(), already);
    }

    #[test]
    fn test_rejects_malformed_input() {
        let reducer = MatrixReducer::new(ReducerConfig::new().with_steps(true));
        assert_eq!(
            reducer.reduce_list(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(MatrixError::Shape(ShapeError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }))
        );
        assert_eq!(
            reducer.reduce_list(Vec::<Vec<f64>>::new()),
            Err(MatrixError::Shape(ShapeError::NoRows))
        );
        assert_eq!(
            reducer.reduce_list(vec![Vec::<f64>::new()]),
            Err(MatrixError::Shape(ShapeError::NoColumns))
        );
        assert!(matches!(
            reducer.reduce_list(vec![vec![1.0, f64::NEG_INFINITY]]),
            Err(MatrixError::InvalidValue { row: 0, col: 1, .. })
        ));

        // raw matrices bypassing from_list are checked too
        let raw = MatrixReal {
            rows: 2,
            cols: 2,
            cells: vec![1.0, f64::NAN, 3.0, 4.0],
        };
        assert!(matches!(
            reducer.reduce(&raw),
            Err(MatrixError::InvalidValue { row: 0, col: 1, .. })
        ));
        let raw = MatrixReal {
            rows: 2,
            cols: 2,
            cells: vec![1.0, 2.0, 3.0],
        };
        assert!(reducer.reduce(&raw).unwrap_err().is_shape_error());

        let bad_config = MatrixReducer::new(ReducerConfig::new().with_epsilon(f64::NAN));
        assert!(matches!(
            bad_config.reduce_list(vec![vec![1.0]]),
            Err(MatrixError::InvalidEpsilon(_))
        ));
    }

    #[test]
    fn test_does_not_mutate_input() {
        let matrix = MatrixReal::from_list(vec![vec![2.0, 4.0], vec![1.0, 3.0]]).unwrap();
        let copy = matrix.clone();
        let _ = MatrixReducer::default().reduce(&matrix).unwrap();
        assert_eq!(matrix, copy);
    }

    #[test]
    fn test_partial_pivoting_tie_break() {
        let reducer = MatrixReducer::new(ReducerConfig::new().with_steps(true));

        // |-3| beats 1, so row 1 is swapped to the top
        let result = reducer
            .reduce_list(vec![vec![1.0, 2.0], vec![-3.0, 1.0]])
            .unwrap();
        let steps = result.steps.unwrap();
        assert_eq!(steps[0], RowOperation::Swap { a: 0, b: 1 });

        // equal magnitudes: the topmost row stays the pivot
        let result = reducer
            .reduce_list(vec![vec![0.0, 1.0], vec![2.0, 5.0], vec![-2.0, 3.0]])
            .unwrap();
        let steps = result.steps.unwrap();
        assert_eq!(steps[0], RowOperation::Swap { a: 0, b: 1 });
        assert_eq!(
            steps[1],
            RowOperation::Scale {
                row: 0,
                factor: 0.5
            }
        );
        assert_eq!(result.pivot_columns, vec![0, 1]);
    }

    #[test]
    fn test_noise_is_snapped() {
        let result = reduce(vec![
            vec![0.1, 0.2, 0.3],
            vec![0.4, 0.5, 0.6],
            vec![0.7, 0.8, 0.9],
        ])
        .unwrap();
        assert_eq!(result.pivot_columns, vec![0, 1]);
        assert_eq!(result.matrix.row(2), &[0.0, 0.0, 0.0]);
        assert!(result
            .matrix
            .cells
            .iter()
            .all(|x| *x == 0.0 && x.is_sign_positive() || x.abs() > 1e-10));
        assert!(approx_eq_lists(
            &result.matrix.to_list(),
            &[
                vec![1.0, 0.0, -1.0],
                vec![0.0, 1.0, 2.0],
                vec![0.0, 0.0, 0.0]
            ],
            1e-9
        ));

        // below the threshold a column has no pivot at all
        let result = reduce(vec![vec![1e-12, 1.0], vec![0.0, 2.0]]).unwrap();
        assert_eq!(result.pivot_columns, vec![1]);
        assert_eq!(
            result.matrix.to_list(),
            vec![vec![0.0, 1.0], vec![0.0, 0.0]]
        );
    }

    #[test]
    fn test_relative_and_absolute_tolerance() {
        let lines = vec![vec![1e6, 1.0], vec![1e-5, 1.0]];

        let relative = reduce(lines.clone()).unwrap();
        assert!((relative.tolerance - 1e-4).abs() < 1e-12);
        assert_eq!(relative.pivot_columns, vec![0, 1]);

        // a large absolute epsilon swallows the second column
        let absolute = MatrixReducer::new(
            ReducerConfig::new()
                .with_tolerance(Tolerance::Absolute)
                .with_epsilon(2.0),
        )
        .reduce_list(lines)
        .unwrap();
        assert_eq!(absolute.tolerance, 2.0);
        assert_eq!(absolute.pivot_columns, vec![0]);
        assert_eq!(
            absolute.matrix.to_list(),
            vec![vec![1.0, 0.0], vec![0.0, 0.0]]
        );
    }

    #[test]
    fn test_shapes() {
        // zero matrix
        let result = reduce(vec![vec![0.0, 0.0], vec![0.0, 0.0]]).unwrap();
        assert!(result.pivot_columns.is_empty());
        assert_eq!(result.classification, Some(SystemClassification::Infinite));

        // single column
        let result = reduce(vec![vec![0.0], vec![-4.0]]).unwrap();
        assert_eq!(result.matrix.to_list(), vec![vec![1.0], vec![0.0]]);
        assert_eq!(result.classification, None);

        // more columns than rows
        let result = reduce(vec![vec![2.0, 4.0, 6.0, 8.0]]).unwrap();
        assert_eq!(result.matrix.to_list(), vec![vec![1.0, 2.0, 3.0, 4.0]]);
        assert_eq!(result.free_variables(), vec![1, 2]);

        // more rows than columns
        let result = reduce(vec![vec![1.0, 2.0], vec![2.0, 4.0], vec![0.0, 1.0]]).unwrap();
        assert_eq!(
            result.matrix.to_list(),
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]
        );
        assert_eq!(
            result.classification,
            Some(SystemClassification::Inconsistent)
        );
    }

    #[test]
    fn test_steps_replay() {
        let lines = vec![
            vec![0.0, 2.0, 1.0, 4.0],
            vec![3.0, -1.0, 2.0, 1.0],
            vec![6.0, 1.0, 5.0, 9.0],
        ];
        let result = MatrixReducer::new(ReducerConfig::new().with_steps(true))
            .reduce_list(lines.clone())
            .unwrap();

        let mut replayed = MatrixReal::from_list(lines.clone()).unwrap();
        for step in result.steps.as_ref().unwrap() {
            replayed.apply(step);
        }
        assert!(approx_eq_lists(
            &replayed.to_list(),
            &result.matrix.to_list(),
            1e-9
        ));

        let silent = reduce(lines).unwrap();
        assert_eq!(silent.steps, None);
        assert_eq!(silent.matrix, result.matrix);
    }

    #[test]
    fn test_random_properties() {
        init();
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let reducer = MatrixReducer::default();

        for _ in 0..500 {
            let matrix = random_matrix(&mut rng);
            let result = reducer.reduce(&matrix).unwrap();

            assert_eq!(
                (result.matrix.rows, result.matrix.cols),
                (matrix.rows, matrix.cols)
            );
            assert!(result.matrix.is_rref(0.0), "not in RREF:\n{}", result.matrix);
            assert!(result.rank() <= matrix.rows.min(matrix.cols));
            assert!(result.pivot_columns.windows(2).all(|w| w[0] < w[1]));
            assert!(result
                .pivots
                .iter()
                .enumerate()
                .all(|(i, p)| p.row == i && result.matrix.at(p.row, p.col) == 1.0));

            let again = reducer.reduce(&result.matrix).unwrap();
            assert_eq!(again.pivot_columns, result.pivot_columns);
            // the second pass may only snap entries below its own tolerance
            assert!(approx_eq_lists(
                &again.matrix.to_list(),
                &result.matrix.to_list(),
                again.tolerance
            ));
        }
    }

    #[test]
    fn test_reduce_many() {
        let matrices = vec![
            MatrixReal::from_list(vec![vec![1.0, 1.0, 2.0], vec![1.0, 1.0, 5.0]]).unwrap(),
            MatrixReal::from_list(vec![vec![1.0, 2.0, 8.0], vec![3.0, -1.0, 3.0]]).unwrap(),
            MatrixReal {
                rows: 1,
                cols: 1,
                cells: vec![f64::NAN],
            },
            MatrixReal::from_list(vec![vec![1.0, 1.0, 2.0], vec![2.0, 2.0, 4.0]]).unwrap(),
        ];
        let results = MatrixReducer::default().reduce_many(&matrices);
        assert_eq!(results.len(), 4);
        assert_eq!(
            results[0].as_ref().unwrap().classification,
            Some(SystemClassification::Inconsistent)
        );
        assert_eq!(
            results[1].as_ref().unwrap().classification,
            Some(SystemClassification::Unique)
        );
        assert!(results[2].is_err());
        assert_eq!(
            results[3].as_ref().unwrap().classification,
            Some(SystemClassification::Infinite)
        );
    }
}
