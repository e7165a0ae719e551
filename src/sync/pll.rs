//! Complex baseband digital PLL
//!
//! NCO + phase detector + lead-lag loop filter. The NCO at sample `k` is
//! driven by the loop filter output from sample `k − 1`, so the loop is
//! strictly causal.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use super::check_finite;
use crate::domain::{NcoConfig, SyncResult, TrackingLoopConfig};
use crate::dsp::loop_filter::{loop_parms2, LoopFilter2};
use crate::dsp::nco::Nco;

/// Damping factor used for the PLL loop filter design
pub const PLL_DAMPING: f64 = 0.707;

/// Loop signals for one input sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PllStep {
    /// Phase detector output `Im(x·conj(nco))`
    pub detector: f64,
    pub loop_filter: f64,
    pub nco: Complex64,
}

/// Loop signals for a whole record
#[derive(Debug, Clone, Default, Serialize)]
pub struct PllOutput {
    pub detector: Vec<f64>,
    pub loop_filter: Vec<f64>,
    pub nco: Vec<Complex64>,
}

/// Sample-by-sample complex baseband PLL
pub struct ComplexPll {
    nco: Nco,
    loop_filter: LoopFilter2,
    detector_gain: f64,
    open_loop: bool,
    last_correction: f64,
}

impl ComplexPll {
    pub fn new(config: &TrackingLoopConfig) -> SyncResult<Self> {
        config.validate()?;
        let nco = Nco::new(&NcoConfig {
            center_frequency: config.center_frequency,
            sample_rate: config.clock_rate,
            gain: 1.0,
            initial_state: 0,
            bit_width: 32,
        })?;
        // The NCO turns a unit control input into 2π radians of phase
        let (alpha1, alpha2) =
            loop_parms2(config.noise_bandwidth, PLL_DAMPING, 2.0 * PI, config.clock_rate)?;
        log::debug!("PLL (kp, ki) = ({alpha1:.3e}, {alpha2:.3e})");
        Ok(Self {
            nco,
            loop_filter: LoopFilter2::new(alpha1, alpha2),
            detector_gain: config.detector_gain,
            open_loop: config.open_loop,
            last_correction: 0.0,
        })
    }

    /// Process a single input sample
    pub fn process(&mut self, x: Complex64) -> PllStep {
        if self.open_loop {
            self.nco.update(0.0);
        } else {
            self.nco.update(self.last_correction);
        }
        let nco = self.nco.out_exp();
        let detector = (x * nco.conj()).im;
        let loop_filter = self.loop_filter.filter(self.detector_gain * detector);
        self.last_correction = loop_filter;
        PllStep {
            detector,
            loop_filter,
            nco,
        }
    }

    /// The oscillator driven by the loop
    pub fn nco(&self) -> &Nco {
        &self.nco
    }
}

/// Run a digital complex baseband PLL over `x`
pub fn cbb_pll(x: &[Complex64], config: &TrackingLoopConfig) -> SyncResult<PllOutput> {
    check_finite(x)?;
    let mut pll = ComplexPll::new(config)?;
    let mut out = PllOutput {
        detector: Vec::with_capacity(x.len()),
        loop_filter: Vec::with_capacity(x.len()),
        nco: Vec::with_capacity(x.len()),
    };
    for &sample in x {
        let step = pll.process(sample);
        out.detector.push(step.detector);
        out.loop_filter.push(step.loop_filter);
        out.nco.push(step.nco);
    }
    log::debug!("PLL processed {} samples", x.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(f0: f64, fs: f64, phase: f64, n: usize) -> Vec<Complex64> {
        (0..n)
            .map(|k| Complex64::from_polar(1.0, 2.0 * PI * f0 * k as f64 / fs + phase))
            .collect()
    }

    fn config(bn: f64) -> TrackingLoopConfig {
        TrackingLoopConfig {
            noise_bandwidth: bn,
            clock_rate: 100e3,
            ..Default::default()
        }
    }

    #[test]
    fn test_pll_locks_to_frequency_offset() {
        let x = tone(200.0, 100e3, 0.4, 5000);
        let out = cbb_pll(&x, &config(1000.0)).unwrap();

        let tail = &out.detector[4900..];
        assert!(
            tail.iter().all(|e| e.abs() < 1e-3),
            "phase error should settle to zero"
        );
        // Type II loop: the integrator holds the offset, in cycles per sample
        let last = *out.loop_filter.last().unwrap();
        assert!((last - 200.0 / 100e3).abs() < 1e-5, "loop filter {last}");
    }

    #[test]
    fn test_pll_first_sample_uses_zero_correction() {
        let x = tone(0.0, 100e3, 1.0, 4);
        let mut pll = ComplexPll::new(&config(500.0)).unwrap();
        let first = pll.process(x[0]);
        assert_eq!(first.nco, Complex64::new(1.0, 0.0));
        assert!((first.detector - 1.0f64.sin()).abs() < 1e-12);
        let second = pll.process(x[1]);
        assert_ne!(second.nco, first.nco, "second sample sees the first correction");
    }

    #[test]
    fn test_open_loop_holds_center_frequency() {
        let x = tone(300.0, 100e3, 0.0, 200);
        let cfg = TrackingLoopConfig {
            open_loop: true,
            ..config(1000.0)
        };
        let out = cbb_pll(&x, &cfg).unwrap();
        assert!(out.nco.iter().all(|&z| z == Complex64::new(1.0, 0.0)));
        for (k, &e) in out.detector.iter().enumerate() {
            assert!((e - x[k].im).abs() < 1e-12);
        }
    }

    #[test]
    fn test_nonfinite_input_is_rejected() {
        let x = vec![Complex64::new(f64::NAN, 0.0)];
        assert!(cbb_pll(&x, &config(100.0)).is_err());
    }
}
