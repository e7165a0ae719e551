//! Decision-directed carrier phase recovery
//!
//! A type II phase loop at one sample per symbol. Each symbol is derotated
//! by the current estimate, sliced to the nearest constellation point, and
//! the phase error between the two drives the loop filter.
//!
//! After M. Rice, *Digital Communications: A Discrete-Time Approach*; the
//! QAM ratio detector follows Ouyang and Wang (2002).

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::Serialize;

use super::check_finite;
use crate::domain::{CarrierSyncConfig, Modulation, PhaseDetector, SyncError, SyncResult};
use crate::dsp::loop_filter::type2_gains;
use crate::dsp::normalize::std_dev;
use crate::dsp::slicer::Slicer;

/// One sample per symbol
const NS: f64 = 1.0;
const KP: f64 = 1.0;
const K0: f64 = 1.0;

/// Per-symbol outputs of the carrier loop
#[derive(Debug, Clone, Default, Serialize)]
pub struct CarrierSyncOutput {
    /// Derotated input (soft symbols), at the input scale
    pub rotated: Vec<Complex64>,
    /// Hard decisions at the constellation points
    pub decisions: Vec<Complex64>,
    /// Phase error into the loop filter
    pub phase_error: Vec<f64>,
    /// Phase estimate after each update, in `[0, 2π)`
    pub phase_track: Vec<f64>,
}

/// Wrap an angle to `[-π, π]`
fn wrap_phase(theta: f64) -> f64 {
    theta.sin().atan2(theta.cos())
}

fn phase_error(
    detector: PhaseDetector,
    rotated: Complex64,
    decision: Complex64,
    index: usize,
) -> SyncResult<f64> {
    match detector {
        PhaseDetector::MaxLikelihood => {
            Ok(rotated.im * decision.re - rotated.re * decision.im)
        }
        PhaseDetector::Heuristic => Ok(wrap_phase(rotated.arg() - decision.arg())),
        PhaseDetector::QamRatio => {
            if decision.norm_sqr() == 0.0 {
                return Err(SyncError::DegenerateSignal(format!(
                    "zero decision at symbol {index} in the ratio detector"
                )));
            }
            Ok((rotated / decision).im)
        }
    }
}

/// Track carrier phase on `z`, one complex sample per symbol
pub fn dd_carrier_sync(
    z: &[Complex64],
    config: &CarrierSyncConfig,
) -> SyncResult<CarrierSyncOutput> {
    config.validate()?;
    check_finite(z)?;
    let slicer = Slicer::new(config.modulation)?;
    let (k1, k2) = type2_gains(config.loop_bandwidth, config.damping, NS, KP, K0)?;
    if z.is_empty() {
        return Ok(CarrierSyncOutput::default());
    }

    // QAM decisions assume the odd-integer grid; scale by the known
    // relationship between signal power and grid spacing
    let z_scale = match config.modulation {
        Modulation::Qam { order } => {
            let scale = std_dev(z) * (3.0 / (2.0 * (order as f64 - 1.0))).sqrt();
            if !(scale > 0.0) {
                return Err(SyncError::DegenerateSignal(
                    "QAM input has zero standard deviation".to_string(),
                ));
            }
            Some(scale)
        }
        Modulation::Psk { .. } => None,
    };

    let mut out = CarrierSyncOutput {
        rotated: Vec::with_capacity(z.len()),
        decisions: Vec::with_capacity(z.len()),
        phase_error: Vec::with_capacity(z.len()),
        phase_track: Vec::with_capacity(z.len()),
    };

    let mut theta_hat: f64 = 0.0;
    let mut vi = 0.0;
    for (n, &sample) in z.iter().enumerate() {
        let input = z_scale.map_or(sample, |s| sample / s);
        let rotated = input * Complex64::from_polar(1.0, -theta_hat);
        let decision = slicer.decide(rotated);
        let e = phase_error(config.detector, rotated, decision, n)?;

        let vp = k1 * e;
        vi += k2 * e;
        theta_hat = (theta_hat + vp + vi).rem_euclid(2.0 * PI);

        out.rotated.push(rotated);
        out.decisions.push(decision);
        out.phase_error.push(e);
        out.phase_track.push(theta_hat);
        if config.open_loop {
            theta_hat = 0.0;
        }
    }

    if let Some(scale) = z_scale {
        for v in out.rotated.iter_mut() {
            *v *= scale;
        }
    }
    log::debug!("carrier sync: {} symbols tracked", z.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic symbol indices in `0..m`
    fn indices(n: usize, m: u32) -> Vec<u32> {
        let mut state: u32 = 0x1234_5678;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 16) % m
            })
            .collect()
    }

    fn qpsk(n: usize, phi: f64) -> Vec<Complex64> {
        indices(n, 4)
            .into_iter()
            .map(|k| Complex64::from_polar(1.0, PI / 4.0 + PI / 2.0 * k as f64 + phi))
            .collect()
    }

    #[test]
    fn test_qpsk_ml_loop_removes_constant_offset() {
        let phi0 = 0.3;
        let z = qpsk(600, phi0);
        let cfg = CarrierSyncConfig {
            loop_bandwidth: 0.05,
            ..Default::default()
        };
        let out = dd_carrier_sync(&z, &cfg).unwrap();
        assert!(out.phase_error[550..].iter().all(|e| e.abs() < 1e-6));
        let theta = *out.phase_track.last().unwrap();
        assert!((theta - phi0).abs() < 1e-6, "theta {theta}");
    }

    #[test]
    fn test_heuristic_detector_measures_angle() {
        let z = qpsk(1, 0.1);
        let cfg = CarrierSyncConfig {
            detector: PhaseDetector::Heuristic,
            open_loop: true,
            ..Default::default()
        };
        let out = dd_carrier_sync(&z, &cfg).unwrap();
        assert!((out.phase_error[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_open_loop_keeps_estimate_at_zero() {
        let z = qpsk(50, 0.2);
        let cfg = CarrierSyncConfig {
            open_loop: true,
            ..Default::default()
        };
        let out = dd_carrier_sync(&z, &cfg).unwrap();
        // Every symbol is derotated by zero, so the input passes straight through
        for (a, b) in out.rotated.iter().zip(&z) {
            assert!((a - b).norm() < 1e-15);
        }
        assert!(out.phase_error.iter().all(|e| (e - 0.2f64.sin()).abs() < 1e-12));
    }

    #[test]
    fn test_16qam_tracks_and_restores_scale() {
        let levels = [-3.0, -1.0, 1.0, 3.0];
        let idx = indices(2000, 16);
        let phi0 = 0.1;
        let z: Vec<Complex64> = idx
            .iter()
            .map(|&k| {
                let a = Complex64::new(levels[(k % 4) as usize], levels[(k / 4) as usize]);
                a * 0.25 * Complex64::from_polar(1.0, phi0)
            })
            .collect();
        let cfg = CarrierSyncConfig {
            modulation: Modulation::Qam { order: 16 },
            loop_bandwidth: 0.02,
            detector: PhaseDetector::QamRatio,
            ..Default::default()
        };
        let out = dd_carrier_sync(&z, &cfg).unwrap();
        let theta = *out.phase_track.last().unwrap();
        assert!((theta - phi0).abs() < 0.01, "theta {theta}");
        // Soft outputs come back at the input scale
        for (a, b) in out.rotated.iter().zip(&z) {
            assert!((a.norm() - b.norm()).abs() < 1e-12);
        }
        // Decisions sit on the odd-integer grid
        let last = out.decisions[1999];
        assert_eq!(last.re.abs() % 2.0, 1.0);
        assert_eq!(last.im.abs() % 2.0, 1.0);
    }

    #[test]
    fn test_8psk_decisions_on_unit_circle() {
        let z: Vec<Complex64> = indices(300, 8)
            .into_iter()
            .map(|k| Complex64::from_polar(1.0, PI / 4.0 * k as f64 + 0.15))
            .collect();
        let cfg = CarrierSyncConfig {
            modulation: Modulation::Psk { order: 8 },
            loop_bandwidth: 0.05,
            ..Default::default()
        };
        let out = dd_carrier_sync(&z, &cfg).unwrap();
        assert!(out.decisions.iter().all(|a| (a.norm() - 1.0).abs() < 1e-12));
        let theta = *out.phase_track.last().unwrap();
        assert!((theta - 0.15).abs() < 1e-4, "theta {theta}");
    }

    #[test]
    fn test_empty_record_gives_empty_output() {
        for modulation in [Modulation::Psk { order: 4 }, Modulation::Qam { order: 16 }] {
            let cfg = CarrierSyncConfig {
                modulation,
                ..Default::default()
            };
            let out = dd_carrier_sync(&[], &cfg).unwrap();
            assert!(out.rotated.is_empty() && out.phase_track.is_empty());
        }
        // Configuration is still checked first
        let bad = CarrierSyncConfig {
            modulation: Modulation::Qam { order: 32 },
            ..Default::default()
        };
        assert!(dd_carrier_sync(&[], &bad).is_err());
    }

    #[test]
    fn test_unsupported_modulation_is_a_config_error() {
        let cfg = CarrierSyncConfig {
            modulation: Modulation::Qam { order: 32 },
            ..Default::default()
        };
        assert!(matches!(
            dd_carrier_sync(&qpsk(10, 0.0), &cfg),
            Err(SyncError::UnsupportedModulation { .. })
        ));
    }

    #[test]
    fn test_ratio_detector_rejects_zero_decision() {
        let z = vec![Complex64::new(0.0, 1.0)];
        let cfg = CarrierSyncConfig {
            modulation: Modulation::Psk { order: 2 },
            detector: PhaseDetector::QamRatio,
            ..Default::default()
        };
        assert!(matches!(
            dd_carrier_sync(&z, &cfg),
            Err(SyncError::DegenerateSignal(_))
        ));
    }
}
