//! Non-data-aided timing error detection
//!
//! The detector looks at the symbol-rate spectral line of `|x|²`: over the
//! `Ns` interpolants spanning one symbol it forms
//! `c = (1/Ns) Σ |x(k)|² exp(−j2πk/Ns)`. The phase of `c`, averaged over the
//! last `2L + 1` symbols, is the timing error in fractions of a symbol.

use std::f64::consts::PI;

use num_complex::Complex64;
use ringbuf::{traits::*, HeapRb};

use super::interpolator::FarrowInterpolator;

/// Fixed-length moving sum of raw detector outputs
pub struct TedSmoother {
    history: HeapRb<Complex64>,
    len: usize,
}

impl TedSmoother {
    /// Smoother over `2·half_width + 1` outputs, primed with zeros
    pub fn new(half_width: usize) -> Self {
        let len = 2 * half_width + 1;
        let mut history = HeapRb::new(len);
        for _ in 0..len {
            history.push_overwrite(Complex64::new(0.0, 0.0));
        }
        Self { history, len }
    }

    /// Push the newest output, evicting the oldest, and return the mean
    pub fn push(&mut self, c: Complex64) -> Complex64 {
        self.history.push_overwrite(c);
        self.history.iter().sum::<Complex64>() / self.len as f64
    }
}

/// Spectral-line timing error detector with output smoothing
pub struct SpectralLineTed {
    interp: FarrowInterpolator,
    twiddles: Vec<Complex64>,
    smoother: TedSmoother,
}

impl SpectralLineTed {
    pub fn new(interp: FarrowInterpolator, samples_per_symbol: usize, half_width: usize) -> Self {
        let ns = samples_per_symbol as f64;
        let twiddles = (0..samples_per_symbol)
            .map(|k| Complex64::from_polar(1.0, -2.0 * PI * k as f64 / ns))
            .collect();
        Self {
            interp,
            twiddles,
            smoother: TedSmoother::new(half_width),
        }
    }

    /// Raw statistic `c` for the symbol whose strobe is at `x[n] + mu`
    pub fn statistic(&self, x: &[Complex64], n: usize, mu: f64) -> Complex64 {
        let sum: Complex64 = self
            .twiddles
            .iter()
            .enumerate()
            .map(|(k, &w)| w * self.interp.interpolate(x, n + k, mu).norm_sqr())
            .sum();
        sum / self.twiddles.len() as f64
    }

    /// Smoothed timing error `−arg(mean c)/(2π)`, in symbols
    pub fn detect(&mut self, x: &[Complex64], n: usize, mu: f64) -> f64 {
        let c = self.statistic(x, n, mu);
        let mean = self.smoother.push(c);
        -mean.arg() / (2.0 * PI)
    }
}
