//! Whole-record level normalization

use num_complex::Complex64;

use crate::domain::{SyncError, SyncResult};

/// Population standard deviation of a complex record, `sqrt(mean |x − mean|²)`
pub fn std_dev(x: &[Complex64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    let n = x.len() as f64;
    let mean = x.iter().sum::<Complex64>() / n;
    (x.iter().map(|v| (v - mean).norm_sqr()).sum::<f64>() / n).sqrt()
}

/// Scale `x` in place to unit standard deviation; returns the divisor.
///
/// An empty record is left alone. A record with zero spread is an error
/// rather than a buffer of NaNs.
pub fn normalize_unit_std(x: &mut [Complex64]) -> SyncResult<f64> {
    if x.is_empty() {
        return Ok(1.0);
    }
    let sigma = std_dev(x);
    if !(sigma > 0.0) || !sigma.is_finite() {
        return Err(SyncError::DegenerateSignal(format!(
            "cannot normalize {} samples with standard deviation {sigma}",
            x.len()
        )));
    }
    for v in x.iter_mut() {
        *v /= sigma;
    }
    Ok(sigma)
}

/// Root-mean-square magnitude, `sqrt(mean |x|²)`
pub fn rms(x: &[Complex64]) -> f64 {
    if x.is_empty() {
        return 0.0;
    }
    (x.iter().map(|v| v.norm_sqr()).sum::<f64>() / x.len() as f64).sqrt()
}

/// Scale a symbol record to unit standard deviation, or to unit RMS when it
/// has no spread (a single symbol, or a constant record).
///
/// Only an all-zero record is rejected.
pub fn normalize_symbols(x: &mut [Complex64]) -> SyncResult<f64> {
    if x.is_empty() || std_dev(x) > 0.0 {
        return normalize_unit_std(x);
    }
    let level = rms(x);
    if !(level > 0.0) || !level.is_finite() {
        return Err(SyncError::DegenerateSignal(format!(
            "all {} symbols are zero",
            x.len()
        )));
    }
    log::debug!("{} symbols with no spread, scaling to unit magnitude", x.len());
    for v in x.iter_mut() {
        *v /= level;
    }
    Ok(level)
}
