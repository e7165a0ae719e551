//! IIR filter implementation
//!
//! Direct-form filter with numerator `b` and denominator `a`, normalized so
//! that `a[0] == 1`. Used to evaluate the linear models of the digital loops.

use crate::domain::{require_nonzero, SyncResult};

/// IIR filter `H(z) = B(z)/A(z)` in transposed direct form II
pub struct IirFilter {
    b: Vec<f64>,
    a: Vec<f64>,
    /// Delay line, one shorter than the longer coefficient vector
    state: Vec<f64>,
}

impl IirFilter {
    /// Create a filter; fails if `a` is empty or `a[0]` is zero
    pub fn new(b: &[f64], a: &[f64]) -> SyncResult<Self> {
        let a0 = require_nonzero("a[0]", a.first().copied().unwrap_or(0.0))?;
        let len = b.len().max(a.len()).max(1);
        let mut bn = vec![0.0; len];
        let mut an = vec![0.0; len];
        for (dst, &src) in bn.iter_mut().zip(b) {
            *dst = src / a0;
        }
        for (dst, &src) in an.iter_mut().zip(a) {
            *dst = src / a0;
        }
        Ok(Self {
            b: bn,
            a: an,
            state: vec![0.0; len - 1],
        })
    }

    /// Process a single sample through the filter
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b[0] * x + self.state.first().copied().unwrap_or(0.0);
        let order = self.state.len();
        for i in 0..order {
            let next = if i + 1 < order { self.state[i + 1] } else { 0.0 };
            self.state[i] = next + self.b[i + 1] * x - self.a[i + 1] * y;
        }
        y
    }

    /// Reset the filter state
    pub fn reset(&mut self) {
        self.state.fill(0.0);
    }
}

/// Filter a whole record from zero initial state
pub fn lfilter(b: &[f64], a: &[f64], x: &[f64]) -> SyncResult<Vec<f64>> {
    let mut filter = IirFilter::new(b, a)?;
    Ok(x.iter().map(|&v| filter.process(v)).collect())
}
