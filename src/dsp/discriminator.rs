//! Quadricorrelator frequency discriminator
//!
//! Estimates instantaneous frequency from two consecutive complex samples:
//! the I/Q derivatives are approximated by a single backward difference and
//! the cross product is normalized by the squared envelope, which also acts
//! as a limiter.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::domain::{FrequencyUnits, SyncError, SyncResult};

/// Stateful discriminator for sample-by-sample loops such as the AFC
#[derive(Debug, Clone)]
pub struct Discriminator {
    f_clk: f64,
    prev: Complex64,
    /// Samples seen so far, for error reporting
    index: usize,
}

impl Discriminator {
    pub fn new(f_clk: f64) -> Self {
        Self::with_state(f_clk, Complex64::new(0.0, 0.0))
    }

    pub fn with_state(f_clk: f64, prev: Complex64) -> Self {
        Self {
            f_clk,
            prev,
            index: 0,
        }
    }

    /// Frequency estimate for `x`; errors if `x` has zero envelope
    pub fn update(&mut self, x: Complex64, units: FrequencyUnits) -> SyncResult<f64> {
        let radians = quadricorrelate(x, self.prev).ok_or(SyncError::ZeroEnvelope(self.index))?;
        self.prev = x;
        self.index += 1;
        Ok(match units {
            FrequencyUnits::Hz => radians * self.f_clk / (2.0 * PI),
            FrequencyUnits::Normalized => radians / (2.0 * PI),
        })
    }
}

/// `Im(conj(x)·(x − prev)) / |x|²` in radians per sample
fn quadricorrelate(x: Complex64, prev: Complex64) -> Option<f64> {
    let envelope = x.norm_sqr();
    if !(envelope > 0.0) || !envelope.is_finite() {
        return None;
    }
    let d = x - prev;
    let out = (x.re * d.im - x.im * d.re) / envelope;
    out.is_finite().then_some(out)
}

/// Batch discriminator over a whole record, starting from zero state.
///
/// Output is in radians per sample.
pub fn discrim(x: &[Complex64]) -> SyncResult<Vec<f64>> {
    let mut prev = Complex64::new(0.0, 0.0);
    x.iter()
        .enumerate()
        .map(|(k, &sample)| {
            let out = quadricorrelate(sample, prev).ok_or(SyncError::ZeroEnvelope(k))?;
            prev = sample;
            Ok(out)
        })
        .collect()
}
