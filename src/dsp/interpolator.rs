//! Farrow fractional-delay interpolators
//!
//! Every order works on the same four-sample window
//! `[x[n-1], x[n], x[n+1], x[n+2]]`: one sample of lookback and two of
//! lookahead. Each table row holds the window weights for one power of `mu`,
//! lowest power first, and the polynomial is evaluated in Horner form.
//!
//! The linear interpolator spans `x[n-1]..x[n]`; the parabolic and cubic
//! interpolators span `x[n]..x[n+1]`.

use num_complex::Complex64;

use crate::domain::InterpolatorOrder;

const LINEAR: [[f64; 4]; 2] = [[1.0, 0.0, 0.0, 0.0], [-1.0, 1.0, 0.0, 0.0]];

/// Piecewise parabolic, alpha = 1/2
const PARABOLIC: [[f64; 4]; 3] = [
    [0.0, 1.0, 0.0, 0.0],
    [-0.5, -0.5, 1.5, -0.5],
    [0.5, -0.5, -0.5, 0.5],
];

/// Piecewise cubic (Lagrange)
const CUBIC: [[f64; 4]; 4] = [
    [0.0, 1.0, 0.0, 0.0],
    [-1.0 / 3.0, -0.5, 1.0, -1.0 / 6.0],
    [0.5, -1.0, 0.5, 0.0],
    [-1.0 / 6.0, 0.5, -0.5, 1.0 / 6.0],
];

/// Samples of lookback the window needs
pub const LOOKBACK: usize = 1;
/// Samples of lookahead the window needs
pub const LOOKAHEAD: usize = 2;

/// Farrow interpolator of a fixed order
#[derive(Debug, Clone, Copy)]
pub struct FarrowInterpolator {
    rows: &'static [[f64; 4]],
}

impl FarrowInterpolator {
    pub fn new(order: InterpolatorOrder) -> Self {
        let rows: &'static [[f64; 4]] = match order {
            InterpolatorOrder::Linear => &LINEAR,
            InterpolatorOrder::Parabolic => &PARABOLIC,
            InterpolatorOrder::Cubic => &CUBIC,
        };
        Self { rows }
    }

    /// Interpolant at fractional offset `mu` relative to base index `n`.
    ///
    /// # Panics
    ///
    /// If the window `x[n-1..=n+2]` does not fit inside `x`.
    pub fn interpolate(&self, x: &[Complex64], n: usize, mu: f64) -> Complex64 {
        let window = &x[n - LOOKBACK..=n + LOOKAHEAD];
        self.rows.iter().rev().fold(Complex64::new(0.0, 0.0), |acc, row| {
            let v: Complex64 = row.iter().zip(window).map(|(&c, &s)| s * c).sum();
            acc * mu + v
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(values: &[f64]) -> Vec<Complex64> {
        values.iter().map(|&v| Complex64::new(v, 0.0)).collect()
    }

    #[test]
    fn test_rows_sum_to_unit_gain() {
        // At mu = 0 and mu = 1 each interpolator reproduces an input sample,
        // so the weights summed over the window give 1 for row 0 and 0 for
        // the higher rows.
        for rows in [&LINEAR[..], &PARABOLIC[..], &CUBIC[..]] {
            let sums: Vec<f64> = rows.iter().map(|r| r.iter().sum()).collect();
            assert!((sums[0] - 1.0).abs() < 1e-12);
            assert!(sums[1..].iter().all(|s| s.abs() < 1e-12));
        }
    }

    #[test]
    fn test_endpoints_reproduce_samples() {
        let x = real(&[0.0, 2.0, -1.0, 4.0, 7.0]);
        let lin = FarrowInterpolator::new(InterpolatorOrder::Linear);
        assert_eq!(lin.interpolate(&x, 2, 0.0).re, 2.0);
        assert!((lin.interpolate(&x, 2, 1.0).re - (-1.0)).abs() < 1e-12);
        for order in [InterpolatorOrder::Parabolic, InterpolatorOrder::Cubic] {
            let interp = FarrowInterpolator::new(order);
            assert!((interp.interpolate(&x, 2, 0.0).re - (-1.0)).abs() < 1e-12);
            assert!((interp.interpolate(&x, 2, 1.0).re - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cubic_is_exact_on_cubic_polynomial() {
        let p = |t: f64| t * t * t - 2.0 * t + 0.5;
        let x = real(&(0..6).map(|k| p(k as f64)).collect::<Vec<_>>());
        let interp = FarrowInterpolator::new(InterpolatorOrder::Cubic);
        for &mu in &[0.1, 0.3, 0.5, 0.77] {
            let y = interp.interpolate(&x, 2, mu);
            assert!((y.re - p(2.0 + mu)).abs() < 1e-9, "mu {mu}: {}", y.re);
        }
    }

    #[test]
    fn test_parabolic_is_exact_on_ramp() {
        let x: Vec<Complex64> = (0..5)
            .map(|k| Complex64::new(k as f64, -2.0 * k as f64))
            .collect();
        let interp = FarrowInterpolator::new(InterpolatorOrder::Parabolic);
        let y = interp.interpolate(&x, 1, 0.25);
        assert!((y.re - 1.25).abs() < 1e-12);
        assert!((y.im + 2.5).abs() < 1e-12);
    }
}
