//! Analog-equivalent PLL simulation models
//!
//! Continuous-time loops discretized by trapezoidal integration of both the
//! loop filter and the VCO. Used to check the digital loops against textbook
//! second-order behaviour. The phase detector gain is taken as 1 V/rad and
//! the loop filter DC gain as 1; the loop gain `K` is applied ahead of the
//! filter and the VCO gain `Kv` at the VCO.
//!
//! Loop topologies:
//! - first order, `F(s) = 1`, `K = 2π·fn` (fn is the cutoff);
//! - integrator with lead, `F(s) = (1 + s·tau2)/(s·tau1)`, a type II loop;
//! - lowpass with lead, `F(s) = (1 + s·tau2)/(1 + s·tau1)`, with `K = Kv`
//!   setting the hold-in range.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use super::check_finite;
use crate::domain::{AnalogPllConfig, LoopTopology, SyncError, SyncResult};

/// Loop signals over a whole record
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalogPllOutput {
    /// VCO phase estimate in radians
    pub theta_hat: Vec<f64>,
    /// VCO control voltage
    pub control: Vec<f64>,
    /// Phase detector input: `theta − theta_hat` for the real-phase model,
    /// `Im(x·conj(exp(j·theta_hat)))` for the complex baseband model
    pub phase_error: Vec<f64>,
}

/// Loop filter and VCO state, advanced one sample at a time
struct AnalogLoop {
    topology: LoopTopology,
    /// Sampling interval
    t: f64,
    /// VCO gain in rad/s/V
    kv: f64,
    k: f64,
    tau1: f64,
    tau2: f64,
    filt_in_last: f64,
    filt_out_last: f64,
    vco_in_last: f64,
    vco_out_last: f64,
}

impl AnalogLoop {
    fn new(config: &AnalogPllConfig) -> SyncResult<Self> {
        config.validate()?;
        let kv = 2.0 * PI * config.vco_gain;
        let (fn_, zeta) = (config.natural_frequency, config.damping);
        let wn = 2.0 * PI * fn_;
        let (k, tau1, tau2) = match config.topology {
            LoopTopology::FirstOrder => (wn, 0.0, 0.0),
            LoopTopology::IntegratorLead => (4.0 * PI * zeta * fn_, 0.0, zeta / (PI * fn_)),
            LoopTopology::LowpassLead => {
                let k = kv;
                let tau1 = k / (wn * wn);
                let tau2 = 2.0 * zeta / wn * (1.0 - wn / k / (2.0 * zeta));
                if !(tau2.is_finite() && tau2 != 0.0) {
                    log::warn!("lowpass-lead loop has degenerate tau2 = {tau2}");
                    return Err(SyncError::InvalidParameter {
                        name: "tau2",
                        value: tau2,
                    });
                }
                (k, tau1, tau2)
            }
        };
        log::debug!(
            "analog PLL {:?}: K = {k:.4e}, tau1 = {tau1:.4e}, tau2 = {tau2:.4e}",
            config.topology
        );
        Ok(Self {
            topology: config.topology,
            t: 1.0 / config.sample_rate,
            kv,
            k,
            tau1,
            tau2,
            filt_in_last: 0.0,
            filt_out_last: 0.0,
            vco_in_last: 0.0,
            vco_out_last: 0.0,
        })
    }

    /// Advance with phase detector output `pd`; returns `(vco_in, vco_out)`
    fn step(&mut self, pd: f64) -> (f64, f64) {
        let half_t = self.t / 2.0;
        let gain_out = self.k / self.kv * pd;

        let vco_in = match self.topology {
            LoopTopology::FirstOrder => gain_out,
            LoopTopology::IntegratorLead => {
                let filt_in = gain_out / self.tau2;
                let filt_out = self.filt_out_last + half_t * (filt_in + self.filt_in_last);
                self.filt_in_last = filt_in;
                self.filt_out_last = filt_out;
                filt_out + gain_out
            }
            LoopTopology::LowpassLead => {
                let filt_in =
                    (self.tau2 / self.tau1) * gain_out - self.filt_out_last / self.tau1;
                let lead = filt_in + self.filt_out_last / self.tau2;
                let filt_out = self.filt_out_last + half_t * (filt_in + self.filt_in_last);
                self.filt_in_last = filt_in;
                self.filt_out_last = filt_out;
                lead
            }
        };

        let vco_acc = self.vco_out_last + half_t * (vco_in + self.vco_in_last);
        self.vco_in_last = vco_in;
        self.vco_out_last = vco_acc;
        (vco_in, self.kv * vco_acc)
    }
}

/// Real-phase analog PLL: `theta` is the input phase deviation in radians
pub fn pll1(theta: &[f64], config: &AnalogPllConfig) -> SyncResult<AnalogPllOutput> {
    if let Some(k) = theta.iter().position(|v| !v.is_finite()) {
        return Err(SyncError::DegenerateSignal(format!(
            "non-finite input phase at index {k}"
        )));
    }
    let mut pll = AnalogLoop::new(config)?;
    let mut out = AnalogPllOutput::with_capacity(theta.len());
    let mut vco_out = 0.0;
    for &th in theta {
        let phi = th - vco_out;
        let pd = if config.nonlinear { phi.sin() } else { phi };
        let (vco_in, next) = pll.step(pd);
        vco_out = next;
        out.push(next, vco_in, phi);
    }
    log::debug!("analog PLL processed {} samples", theta.len());
    Ok(out)
}

/// Complex baseband analog PLL with the sinusoidal detector
/// `Im(x·conj(exp(j·theta_hat)))`
pub fn pll_cbb(x: &[Complex64], config: &AnalogPllConfig) -> SyncResult<AnalogPllOutput> {
    check_finite(x)?;
    let mut pll = AnalogLoop::new(config)?;
    let mut out = AnalogPllOutput::with_capacity(x.len());
    let mut reference = Complex64::new(1.0, 0.0);
    for &sample in x {
        let phi = (sample * reference.conj()).im;
        let (vco_in, vco_out) = pll.step(phi);
        reference = Complex64::from_polar(1.0, vco_out);
        out.push(vco_out, vco_in, phi);
    }
    log::debug!("complex baseband analog PLL processed {} samples", x.len());
    Ok(out)
}

impl AnalogPllOutput {
    fn with_capacity(n: usize) -> Self {
        Self {
            theta_hat: Vec::with_capacity(n),
            control: Vec::with_capacity(n),
            phase_error: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, theta_hat: f64, control: f64, phase_error: f64) {
        self.theta_hat.push(theta_hat);
        self.control.push(control);
        self.phase_error.push(phase_error);
    }
}
