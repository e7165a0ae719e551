//! Test-signal impairments for exercising the synchronizers

use num_complex::Complex64;

use crate::domain::{SyncError, SyncResult};

fn require_samples_per_symbol(ns: usize) -> SyncResult<()> {
    if ns == 0 {
        log::warn!("samples per symbol must be at least 1");
        return Err(SyncError::InvalidParameter {
            name: "ns",
            value: 0.0,
        });
    }
    Ok(())
}

/// Insert a timing step of `t_step` samples at symbol `n_step`.
///
/// The `t_step` samples following sample `ns * n_step` are dropped and the
/// record is zero-padded at the end, so its length is unchanged. Steps past
/// the end of the record leave it unchanged apart from the padding. Fails if
/// `ns` is zero.
pub fn time_step(
    z: &[Complex64],
    ns: usize,
    t_step: usize,
    n_step: usize,
) -> SyncResult<Vec<Complex64>> {
    require_samples_per_symbol(ns)?;
    let split = (ns * n_step).min(z.len());
    let resume = (split + t_step).min(z.len());
    let mut out = Vec::with_capacity(z.len() - (resume - split) + t_step);
    out.extend_from_slice(&z[..split]);
    out.extend_from_slice(&z[resume..]);
    out.resize(out.len() + t_step, Complex64::new(0.0, 0.0));
    Ok(out)
}

/// Decimate `z` to one sample per symbol and rotate every symbol from index
/// `n_step` on by `p_step` radians. Fails if `ns` is zero.
pub fn phase_step(
    z: &[Complex64],
    ns: usize,
    p_step: f64,
    n_step: usize,
) -> SyncResult<Vec<Complex64>> {
    require_samples_per_symbol(ns)?;
    let rotation = Complex64::from_polar(1.0, p_step);
    Ok(z.iter()
        .step_by(ns)
        .enumerate()
        .map(|(n, &v)| if n >= n_step { v * rotation } else { v })
        .collect())
}
