use num_traits::Float;

/// Largest magnitude in `values`, zero for an empty slice.
pub fn max_abs<T: Float>(values: &[T]) -> T {
    values
        .iter()
        .fold(T::zero(), |acc, x| if x.abs() > acc { x.abs() } else { acc })
}

#[inline(always)]
pub fn is_negligible<T: Float>(value: T, tolerance: T) -> bool {
    value.abs() <= tolerance
}

// also turns -0.0 into +0.0
#[inline(always)]
pub fn snap<T: Float>(value: T, tolerance: T) -> T {
    if is_negligible(value, tolerance) {
        T::zero()
    } else {
        value
    }
}

pub fn approx_eq<T: Float>(a: T, b: T, tolerance: T) -> bool {
    (a - b).abs() <= tolerance
}

pub fn approx_eq_lists<T: Float>(a: &[Vec<T>], b: &[Vec<T>], tolerance: T) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(row_a, row_b)| {
            row_a.len() == row_b.len()
                && row_a
                    .iter()
                    .zip(row_b.iter())
                    .all(|(x, y)| approx_eq(*x, *y, tolerance))
        })
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
