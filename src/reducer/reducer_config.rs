use crate::error::MatrixError;
use crate::utils::max_abs;
use num_traits::{Float, NumCast};

pub const DEFAULT_EPSILON: f64 = 1e-10;

/// How `epsilon` turns into the zero threshold of a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tolerance {
    /// `epsilon * max(1, max |a_ij|)`, measured once on the input.
    #[default]
    Relative,
    /// `epsilon` as is.
    Absolute,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducerConfig {
    pub epsilon: f64,
    pub tolerance: Tolerance,
    pub record_steps: bool,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        ReducerConfig {
            epsilon: DEFAULT_EPSILON,
            tolerance: Tolerance::Relative,
            record_steps: false,
        }
    }
}

impl ReducerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_steps(mut self, record_steps: bool) -> Self {
        self.record_steps = record_steps;
        self
    }

    pub fn validate(&self) -> Result<(), MatrixError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(MatrixError::InvalidEpsilon(self.epsilon));
        }
        Ok(())
    }

    /// Zero threshold for a matrix holding `cells`.
    pub fn tolerance_for<T: Float>(&self, cells: &[T]) -> T {
        let epsilon = <T as NumCast>::from(self.epsilon).unwrap_or_else(T::epsilon);
        match self.tolerance {
            Tolerance::Absolute => epsilon,
            Tolerance::Relative => epsilon * max_abs(cells).max(T::one()),
        }
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
