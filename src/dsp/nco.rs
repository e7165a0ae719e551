//! Numerically Controlled Oscillator
//!
//! An n-bit fixed-point phase accumulator. The accumulator word wraps modulo
//! exactly `2^n` for an n-bit width; the arithmetic is done in `i128` and reduced
//! explicitly so narrow widths never depend on native overflow of a wider
//! integer type.

use std::f64::consts::PI;

use num_complex::Complex64;

use crate::domain::{NcoConfig, SyncResult};

/// Fixed-point NCO for signal generation and tracking loops
#[derive(Debug, Clone)]
pub struct Nco {
    /// `2^n`
    modulus: u128,
    k_hat: u64,
    k_old: u64,
    delta_k: u64,
    kc: f64,
    sample_rate: f64,
    fcenter_hat: f64,
}

/// Reduce a signed accumulator value into `[0, modulus)`
fn wrap(value: i128, modulus: u128) -> u64 {
    value.rem_euclid(modulus as i128) as u64
}

impl Nco {
    /// Create an NCO from its configuration.
    ///
    /// Fails with `UnsupportedBitWidth` for widths outside `1..=64`.
    pub fn new(config: &NcoConfig) -> SyncResult<Self> {
        config.validate()?;
        let modulus = 1u128 << config.bit_width;
        let mut nco = Self {
            modulus,
            k_hat: wrap(config.initial_state as i128, modulus),
            k_old: 0,
            delta_k: 0,
            kc: config.gain,
            sample_rate: config.sample_rate,
            fcenter_hat: 0.0,
        };
        nco.set_fcenter(config.center_frequency);
        Ok(nco)
    }

    fn full_scale(&self) -> f64 {
        self.modulus as f64
    }

    /// Advance the accumulator by `delta_k + kc·2^n·e`, rounded to nearest
    pub fn update(&mut self, e: f64) {
        debug_assert!(e.is_finite(), "NCO control input must be finite");
        self.k_old = self.k_hat;
        // delta_k is already an integer, so only the control term needs rounding.
        // Reducing it modulo 2^n first keeps the sum inside i128 for any input;
        // `%` on f64 is exact.
        let control =
            ((self.kc * self.full_scale() * e).round_ties_even() % self.full_scale()) as i128;
        let next = self.k_hat as i128 + self.delta_k as i128 + control;
        self.k_hat = wrap(next, self.modulus);
    }

    /// Current phase as a fraction of a cycle, in `[0, 1)`
    pub fn phase_fraction(&self) -> f64 {
        self.k_hat as f64 / self.full_scale()
    }

    pub fn out_sin(&self) -> f64 {
        (2.0 * PI * self.phase_fraction()).sin()
    }

    pub fn out_cos(&self) -> f64 {
        (2.0 * PI * self.phase_fraction()).cos()
    }

    /// `exp(j·2π·k_hat/2^n)`
    pub fn out_exp(&self) -> Complex64 {
        Complex64::from_polar(1.0, 2.0 * PI * self.phase_fraction())
    }

    /// 50% duty cycle square wave
    pub fn out_square(&self) -> f64 {
        if (self.k_hat as u128) < self.modulus >> 1 {
            1.0
        } else {
            -1.0
        }
    }

    /// True when the most recent update wrapped the accumulator, i.e. on the
    /// positive edge of `out_square`. `thresh` defaults to half scale.
    pub fn pos_edge(&self, thresh: Option<f64>) -> bool {
        let thresh = thresh.unwrap_or((self.modulus >> 1) as f64);
        let delta_theta = self.k_old as f64 - self.k_hat as f64;
        delta_theta > thresh
    }

    /// Retune without disturbing the accumulator phase
    pub fn set_fcenter(&mut self, fcenter: f64) {
        let k = (fcenter * self.full_scale() / self.sample_rate).round_ties_even();
        self.delta_k = wrap(k as i128, self.modulus);
        self.fcenter_hat = k / self.full_scale() * self.sample_rate;
    }

    /// Center frequency actually realized after quantization
    pub fn fcenter_hat(&self) -> f64 {
        self.fcenter_hat
    }

    pub fn k_hat(&self) -> u64 {
        self.k_hat
    }

    pub fn k_old(&self) -> u64 {
        self.k_old
    }

    pub fn delta_k(&self) -> u64 {
        self.delta_k
    }

}
