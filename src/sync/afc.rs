//! Complex baseband automatic frequency control
//!
//! Same structure as the PLL, with the quadricorrelator between the
//! NCO-mixed signal and a first-order loop filter, so the loop tracks
//! frequency error rather than phase error.

use num_complex::Complex64;
use serde::Serialize;

use super::check_finite;
use crate::domain::{BandwidthMode, FrequencyUnits, NcoConfig, SyncResult, TrackingLoopConfig};
use crate::dsp::discriminator::Discriminator;
use crate::dsp::loop_filter::{loop_parms1, LoopFilter1};
use crate::dsp::nco::Nco;

/// Loop signals for one input sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AfcStep {
    /// Discriminator output in Hz
    pub detector: f64,
    /// Frequency correction in Hz
    pub loop_filter: f64,
    /// Input translated by the NCO
    pub mixed: Complex64,
}

/// Loop signals for a whole record
#[derive(Debug, Clone, Default, Serialize)]
pub struct AfcOutput {
    pub detector: Vec<f64>,
    pub loop_filter: Vec<f64>,
    pub mixed: Vec<Complex64>,
}

/// Sample-by-sample frequency tracking loop
pub struct ComplexAfc {
    nco: Nco,
    discriminator: Discriminator,
    loop_filter: LoopFilter1,
    detector_gain: f64,
    clock_rate: f64,
    open_loop: bool,
    last_correction: f64,
}

impl ComplexAfc {
    pub fn new(config: &TrackingLoopConfig) -> SyncResult<Self> {
        config.validate()?;
        let nco = Nco::new(&NcoConfig {
            center_frequency: config.center_frequency,
            sample_rate: config.clock_rate,
            gain: 1.0,
            initial_state: 0,
            bit_width: 32,
        })?;
        let alpha2 = loop_parms1(
            config.noise_bandwidth,
            1.0,
            config.clock_rate,
            BandwidthMode::NoiseEquivalent,
        )?;
        log::debug!("AFC ki = {alpha2:.3e}");
        Ok(Self {
            nco,
            discriminator: Discriminator::new(config.clock_rate),
            loop_filter: LoopFilter1::new(alpha2),
            detector_gain: config.detector_gain,
            clock_rate: config.clock_rate,
            open_loop: config.open_loop,
            last_correction: 0.0,
        })
    }

    /// Process a single input sample; fails if the mixed sample has zero
    /// envelope
    pub fn process(&mut self, x: Complex64) -> SyncResult<AfcStep> {
        if self.open_loop {
            self.nco.update(0.0);
        } else {
            // Correction is in Hz; the NCO wants cycles per sample
            self.nco.update(self.last_correction / self.clock_rate);
        }
        let mixed = x * self.nco.out_exp().conj();
        let detector = self.discriminator.update(mixed, FrequencyUnits::Hz)?;
        let loop_filter = self.loop_filter.filter(self.detector_gain * detector);
        self.last_correction = loop_filter;
        Ok(AfcStep {
            detector,
            loop_filter,
            mixed,
        })
    }

    pub fn nco(&self) -> &Nco {
        &self.nco
    }
}

/// Run a digital complex baseband AFC loop over `x`
pub fn cbb_afc(x: &[Complex64], config: &TrackingLoopConfig) -> SyncResult<AfcOutput> {
    check_finite(x)?;
    let mut afc = ComplexAfc::new(config)?;
    let mut out = AfcOutput {
        detector: Vec::with_capacity(x.len()),
        loop_filter: Vec::with_capacity(x.len()),
        mixed: Vec::with_capacity(x.len()),
    };
    for &sample in x {
        let step = afc.process(sample)?;
        out.detector.push(step.detector);
        out.loop_filter.push(step.loop_filter);
        out.mixed.push(step.mixed);
    }
    log::debug!("AFC processed {} samples", x.len());
    Ok(out)
}
