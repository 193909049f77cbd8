//! Least-squares polynomial regression on a Vandermonde design matrix.

use nalgebra::{DMatrix, DVector};

use super::types::FitError;

/// Fit `order`-degree polynomial coefficients (highest power first) mapping
/// `t` to `v` in the least-squares sense.
///
/// Columns of the design matrix are scaled to unit norm before the SVD
/// solve, and singular values below `len * eps * s_max` are treated as
/// zero. Underdetermined systems return the minimum-norm solution.
pub(crate) fn polyfit(t: &[f64], v: &[f64], order: usize) -> Result<Vec<f64>, FitError> {
    debug_assert_eq!(t.len(), v.len());
    let n = t.len();
    if n == 0 {
        return Err(FitError::NoPoints);
    }
    let cols = order + 1;

    // Column j holds t^(order - j).
    let mut a = DMatrix::<f64>::zeros(n, cols);
    for (i, &ti) in t.iter().enumerate() {
        let mut p = 1.0;
        for j in (0..cols).rev() {
            a[(i, j)] = p;
            p *= ti;
        }
    }

    let mut scale = vec![1.0f64; cols];
    for (j, s) in scale.iter_mut().enumerate() {
        let norm = a.column(j).norm();
        if norm > 0.0 {
            *s = norm;
            a.column_mut(j).unscale_mut(norm);
        }
    }

    let b = DVector::from_column_slice(v);
    let svd = a.svd(true, true);
    let s_max = svd.singular_values.max();
    let rcond = n as f64 * f64::EPSILON;
    let x = svd.solve(&b, rcond * s_max).map_err(FitError::Solver)?;

    let coeffs: Vec<f64> = x.iter().zip(&scale).map(|(c, s)| c / s).collect();
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(FitError::NonFinite);
    }
    Ok(coeffs)
}

/// Horner evaluation of a highest-power-first coefficient list.
pub(crate) fn polyval(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * t + c)
}

/// RMS of `v - p(t)`.
pub(crate) fn rms_residual(coeffs: &[f64], t: &[f64], v: &[f64]) -> f64 {
    if t.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = t
        .iter()
        .zip(v)
        .map(|(&ti, &vi)| {
            let r = vi - polyval(coeffs, ti);
            r * r
        })
        .sum();
    (sum_sq / t.len() as f64).sqrt()
}

/// `n` evenly spaced values from `lo` to `hi`, both ends included.
pub(crate) fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
            out[n - 1] = hi;
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_exact_line() {
        let t = [0.0, 1.0, 2.0, 3.0, 4.0];
        let v: Vec<f64> = t.iter().map(|x| 2.0 * x + 1.0).collect();
        let c = polyfit(&t, &v, 1).unwrap();
        assert_eq!(c.len(), 2);
        assert_abs_diff_eq!(c[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(c[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn recovers_cubic_over_wide_range() {
        let t: Vec<f64> = (0..40).map(|i| 10.0 + i as f64 * 25.0).collect();
        let v: Vec<f64> = t
            .iter()
            .map(|x| 1e-6 * x * x * x - 2e-3 * x * x + 0.5 * x - 7.0)
            .collect();
        let c = polyfit(&t, &v, 3).unwrap();
        assert_abs_diff_eq!(c[0], 1e-6, epsilon = 1e-12);
        assert_abs_diff_eq!(c[1], -2e-3, epsilon = 1e-9);
        assert_abs_diff_eq!(c[2], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(c[3], -7.0, epsilon = 1e-4);
    }

    #[test]
    fn order_zero_is_the_mean() {
        let c = polyfit(&[1.0, 2.0, 3.0], &[4.0, 6.0, 11.0], 0).unwrap();
        assert_eq!(c.len(), 1);
        assert_abs_diff_eq!(c[0], 7.0, epsilon = 1e-12);
    }

    #[test]
    fn underdetermined_fit_still_interpolates() {
        // Two points, quadratic requested: min-norm solution through both.
        let t = [1.0, 2.0];
        let v = [3.0, 5.0];
        let c = polyfit(&t, &v, 2).unwrap();
        assert_eq!(c.len(), 3);
        for (&ti, &vi) in t.iter().zip(&v) {
            assert_abs_diff_eq!(polyval(&c, ti), vi, epsilon = 1e-9);
        }
    }

    #[test]
    fn horner_matches_expanded_form() {
        let c = [3.0, -2.0, 0.5, 4.0];
        let t = 1.7f64;
        let expected = 3.0 * t.powi(3) - 2.0 * t.powi(2) + 0.5 * t + 4.0;
        assert_abs_diff_eq!(polyval(&c, t), expected, epsilon = 1e-12);
    }

    #[test]
    fn linspace_includes_both_ends() {
        let v = linspace(-1.0, 3.0, 5);
        assert_eq!(v, vec![-1.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(linspace(2.0, 9.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
