//! Non-data-aided symbol timing recovery
//!
//! A type II timing loop over an input oversampled at `Ns` samples per
//! symbol. A modulo-1 counter is decremented by the control word
//! `W = 1/Ns + v` every sample; an underflow marks a symbol strobe, sets the
//! fractional interval `mu = CNT/W`, and on the next sample the Farrow
//! interpolator produces the symbol and the spectral-line TED produces the
//! timing error. Between strobes the loop filter keeps integrating the last
//! timing error (zero-order hold).
//!
//! After M. Rice, *Digital Communications: A Discrete-Time Approach*.

use num_complex::Complex64;
use serde::Serialize;

use super::check_finite;
use crate::domain::{SymbolSyncConfig, SyncResult};
use crate::dsp::interpolator::{FarrowInterpolator, LOOKAHEAD};
use crate::dsp::loop_filter::type2_gains;
use crate::dsp::normalize::normalize_symbols;
use crate::dsp::ted::SpectralLineTed;

/// The counter counts down, so the actuator gain is negative
const K0: f64 = -1.0;
/// TED gain; the spectral-line detector measures error directly in symbols
const KP: f64 = 1.0;

/// Symbol-rate outputs of the timing loop, one entry per strobe
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolSyncOutput {
    /// Interpolated symbols, scaled to unit standard deviation (unit RMS when
    /// there is only one)
    pub symbols: Vec<Complex64>,
    /// Smoothed timing error fed to the loop filter at each strobe
    pub timing_error: Vec<f64>,
}

/// First padded-sample index the loop does not visit.
///
/// Keeps the last TED window (`Ns` interpolants starting at the strobe, each
/// with two samples of lookahead) inside the zero-prefixed input.
fn sample_span(input_len: usize, ns: usize) -> usize {
    let padded_len = input_len + 1;
    let whole = (padded_len as f64 / ns as f64 - (ns as f64 - 1.0)).floor();
    if whole <= 0.0 {
        return 0;
    }
    let nominal = ns * whole as usize;
    let last_fit = padded_len.saturating_sub(ns + LOOKAHEAD - 1);
    nominal.min(last_fit)
}

/// Recover symbol timing from `z`, sampled at nominally `Ns` samples per
/// symbol.
pub fn nda_symb_sync(z: &[Complex64], config: &SymbolSyncConfig) -> SyncResult<SymbolSyncOutput> {
    config.validate()?;
    check_finite(z)?;
    let ns = config.samples_per_symbol;
    let (k1, k2) = type2_gains(config.loop_bandwidth, config.damping, ns as f64, KP, K0)?;

    let interp = FarrowInterpolator::new(config.interpolator);
    let mut ted = SpectralLineTed::new(interp, ns, config.smoothing_half_width);

    // One leading zero gives the first strobe its lookback sample
    let mut padded = Vec::with_capacity(z.len() + 1);
    padded.push(Complex64::new(0.0, 0.0));
    padded.extend_from_slice(z);
    let end = sample_span(z.len(), ns);

    let expected = end / ns + 1;
    let mut out = SymbolSyncOutput {
        symbols: Vec::with_capacity(expected),
        timing_error: Vec::with_capacity(expected),
    };

    let mut cnt_next = 0.0;
    let mut mu_next = 0.0;
    let mut underflow = false;
    let mut vi = 0.0;
    let mut epsilon = 0.0;
    for n in 1..end {
        let cnt = cnt_next;
        let mu = mu_next;
        if underflow {
            out.symbols.push(interp.interpolate(&padded, n, mu));
            epsilon = ted.detect(&padded, n, mu);
            out.timing_error.push(epsilon);
        }

        let vp = k1 * epsilon;
        vi += k2 * epsilon;
        let w = 1.0 / ns as f64 + vp + vi;

        cnt_next = cnt - w;
        if cnt_next < 0.0 {
            cnt_next += 1.0;
            underflow = true;
            mu_next = cnt / w;
        } else {
            underflow = false;
            mu_next = mu;
        }
    }

    normalize_symbols(&mut out.symbols)?;
    log::debug!(
        "symbol sync: {} samples in, {} symbols out",
        z.len(),
        out.symbols.len()
    );
    Ok(out)
}
