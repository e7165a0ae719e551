//! Loop filters and gain design
//!
//! `LoopFilter1` is a pure integrator (type I loop, used for frequency-only
//! tracking). `LoopFilter2` is a lead-lag / PI controller (type II loop,
//! zero steady-state phase error under a frequency step).
//!
//! The gain formulas use the usual small-bandwidth digital approximation and
//! are only meaningful for `Bn << fs`.

use std::f64::consts::PI;

use super::accumulator::Accumulator;
use crate::domain::{require_nonzero, require_positive, BandwidthMode, SyncResult};

/// First-order loop filter: `y = alpha2 · Σx`
#[derive(Debug, Clone)]
pub struct LoopFilter1 {
    accum: Accumulator,
    alpha2: f64,
}

impl LoopFilter1 {
    pub fn new(alpha2: f64) -> Self {
        Self::with_state(alpha2, 0.0)
    }

    pub fn with_state(alpha2: f64, state: f64) -> Self {
        Self {
            accum: Accumulator::new(state),
            alpha2,
        }
    }

    pub fn filter(&mut self, x: f64) -> f64 {
        self.accum.update(x);
        self.alpha2 * self.accum.out()
    }
}

/// Second-order lead-lag loop filter: `y = alpha1·x + alpha2 · Σx`
#[derive(Debug, Clone)]
pub struct LoopFilter2 {
    accum: Accumulator,
    alpha1: f64,
    alpha2: f64,
}

impl LoopFilter2 {
    pub fn new(alpha1: f64, alpha2: f64) -> Self {
        Self::with_state(alpha1, alpha2, 0.0)
    }

    pub fn with_state(alpha1: f64, alpha2: f64, state: f64) -> Self {
        Self {
            accum: Accumulator::new(state),
            alpha1,
            alpha2,
        }
    }

    pub fn filter(&mut self, x: f64) -> f64 {
        self.accum.update(x);
        self.alpha1 * x + self.alpha2 * self.accum.out()
    }
}

/// Integrator gain `alpha2` for a first-order loop.
///
/// In `NoiseEquivalent` mode `bn` is the noise bandwidth; in `ThreeDb` mode it
/// is the 3 dB bandwidth of the equivalent one-pole lowpass.
pub fn loop_parms1(bn: f64, kd: f64, fs: f64, mode: BandwidthMode) -> SyncResult<f64> {
    require_positive("bn", bn)?;
    require_nonzero("kd", kd)?;
    require_positive("fs", fs)?;
    let k2 = match mode {
        BandwidthMode::NoiseEquivalent => 1.0 - (-4.0 * bn / fs).exp(),
        BandwidthMode::ThreeDb => 1.0 - (-2.0 * PI * bn / fs).exp(),
    };
    let kc = 1.0;
    let alpha2 = k2 / (kc * kd);
    log::debug!("first-order loop: ki = {alpha2:.3e}");
    Ok(alpha2)
}

/// Proportional and integral gains `(alpha1, alpha2)` for a second-order loop
pub fn loop_parms2(bn: f64, zeta: f64, kd: f64, fs: f64) -> SyncResult<(f64, f64)> {
    require_positive("bn", bn)?;
    require_positive("zeta", zeta)?;
    require_nonzero("kd", kd)?;
    require_positive("fs", fs)?;
    let wn = natural_frequency(bn, zeta);
    let k1 = 2.0 * zeta * wn / fs + 0.5 * (wn / fs).powi(2);
    let k2 = (wn / fs).powi(2);
    let kc = 1.0;
    let (alpha1, alpha2) = (k1 / (kc * kd), k2 / (kc * kd));
    log::debug!("second-order loop: (kp, ki) = ({alpha1:.3e}, {alpha2:.3e})");
    Ok((alpha1, alpha2))
}

/// Second-order loop pull-out frequency in Hz (Gardner)
pub fn loop_pull_out(bn: f64, zeta: f64) -> SyncResult<f64> {
    require_positive("bn", bn)?;
    require_positive("zeta", zeta)?;
    let wn = natural_frequency(bn, zeta);
    Ok(1.8 * wn * (zeta + 1.0) / (2.0 * PI))
}

/// Proportional and integral gains `(K1, K2)` of the batch type II loops.
///
/// `bn_ts` is the loop bandwidth relative to the symbol rate, `ns` the
/// samples per symbol, `kp` the detector gain and `k0` the actuator gain
/// (negative for a down-counting timing controller).
pub fn type2_gains(bn_ts: f64, zeta: f64, ns: f64, kp: f64, k0: f64) -> SyncResult<(f64, f64)> {
    require_positive("loop_bandwidth", bn_ts)?;
    require_positive("damping", zeta)?;
    let denom = zeta + 1.0 / (4.0 * zeta);
    let k1 = 4.0 * zeta / denom * bn_ts / ns / kp / k0;
    let k2 = 4.0 / denom.powi(2) * (bn_ts / ns).powi(2) / kp / k0;
    log::debug!("type II loop: (K1, K2) = ({k1:.3e}, {k2:.3e})");
    Ok((k1, k2))
}

fn natural_frequency(bn: f64, zeta: f64) -> f64 {
    2.0 * bn / (zeta + 1.0 / (4.0 * zeta))
}
