//! Dense solve of the circulation system.
//!
//! LU with partial pivoting through nalgebra by default; with the `lapack`
//! feature the factorization goes through ndarray-linalg instead.

use ndarray::{Array1, Array2};

/// Pivots smaller than this fraction of the largest matrix entry count as zero.
pub const PIVOT_TOLERANCE: f64 = 1e-13;

/// Solves `a x = b`. `None` if `a` is singular, numerically singular, or the
/// solution is not finite.
#[cfg(not(feature = "lapack"))]
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    use nalgebra::{DMatrix, DVector};

    let n = b.len();
    if a.nrows() != n || a.ncols() != n {
        return None;
    }
    let scale = a.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if n == 0 || !(scale > 0.0) || !scale.is_finite() {
        return None;
    }

    let lu = DMatrix::from_fn(n, n, |i, j| a[[i, j]]).lu();
    let min_pivot = lu.u().diagonal().iter().fold(f64::INFINITY, |m, v| m.min(v.abs()));
    if min_pivot < PIVOT_TOLERANCE * scale {
        return None;
    }

    let x = lu.solve(&DVector::from_iterator(n, b.iter().copied()))?;
    finite(Array1::from_iter(x.iter().copied()))
}

/// Solves `a x = b`. `None` if `a` is singular or the solution is not finite.
#[cfg(feature = "lapack")]
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    use ndarray_linalg::Solve;

    let x = a.solve(b).ok()?;
    finite(x)
}

fn finite(x: Array1<f64>) -> Option<Array1<f64>> {
    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_solves_small_system() {
        let a = array![[4.0, 1.0, 0.0], [1.0, 3.0, 1.0], [0.0, 1.0, 2.0]];
        let b = array![1.0, 2.0, 3.0];
        let x = solve(&a, &b).unwrap();
        let residual = a.dot(&x) - &b;
        for r in residual.iter() {
            assert_relative_eq!(*r, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_needs_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let x = solve(&a, &array![2.0, 5.0]).unwrap();
        assert_relative_eq!(x[0], 5.0, epsilon = 1e-14);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_singular_is_reported() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(solve(&a, &array![1.0, 1.0]).is_none());
        assert!(solve(&Array2::zeros((3, 3)), &Array1::ones(3)).is_none());
    }
}
