//! Integration tests: sample-by-sample tracking loops
//!
//! Checks the digital PLL against its linear error model, chains the AFC
//! into the PLL, and compares the two analog-equivalent PLL models.

use std::f64::consts::PI;

use loopsync::domain::{AnalogPllConfig, LoopTopology, NcoConfig, TrackingLoopConfig};
use loopsync::dsp::{discrim, Nco};
use loopsync::sync::response::{phi_freq_step, phi_phase_step};
use loopsync::sync::{cbb_afc, cbb_pll, pll1, pll_cbb};
use num_complex::Complex64;

const FS: f64 = 100e3;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn pll_config() -> TrackingLoopConfig {
    TrackingLoopConfig {
        noise_bandwidth: 1000.0,
        clock_rate: FS,
        ..Default::default()
    }
}

#[test]
fn test_pll_phase_step_follows_linear_model() {
    init_logging();
    let delta = 0.01;
    let x = vec![Complex64::from_polar(1.0, delta); 2000];
    let out = cbb_pll(&x, &pll_config()).unwrap();
    let model = phi_phase_step(2000, 1000.0, 0.707, FS).unwrap();
    // The model delays the integrator by one sample, so agreement is to
    // within a few percent of the step
    for (k, (e, m)) in out.detector.iter().zip(&model).enumerate() {
        let predicted = delta * m / (2.0 * PI);
        assert!(
            (e - predicted).abs() < 0.02 * delta,
            "sample {k}: loop {e}, model {predicted}"
        );
    }
}

#[test]
fn test_pll_frequency_step_follows_linear_model() {
    init_logging();
    let delta_f = 10.0;
    let x: Vec<Complex64> = (0..3000)
        .map(|k| Complex64::from_polar(1.0, 2.0 * PI * delta_f * k as f64 / FS))
        .collect();
    let out = cbb_pll(&x, &pll_config()).unwrap();
    let model = phi_freq_step(3000, 1000.0, 0.707, FS).unwrap();
    let peak = model.iter().fold(0.0f64, |m, v| m.max(v.abs())) * delta_f;
    assert!(peak > 0.01);
    for (k, (e, m)) in out.detector.iter().zip(&model).enumerate() {
        let predicted = delta_f * m;
        assert!(
            (e - predicted).abs() < 3e-4,
            "sample {k}: loop {e}, model {predicted}"
        );
    }
}

#[test]
fn test_nco_generated_tone_is_tracked() {
    init_logging();
    // A free-running 32-bit NCO as the signal source
    let mut source = Nco::new(&NcoConfig {
        center_frequency: 1250.0,
        sample_rate: FS,
        ..Default::default()
    })
    .unwrap();
    let x: Vec<Complex64> = (0..6000)
        .map(|_| {
            source.update(0.0);
            source.out_exp()
        })
        .collect();

    let cfg = TrackingLoopConfig {
        center_frequency: 1200.0,
        ..pll_config()
    };
    let out = cbb_pll(&x, &cfg).unwrap();
    assert!(out.detector[5900..].iter().all(|e| e.abs() < 1e-4));
    // The integrator holds the 50 Hz the center frequency misses
    let last = *out.loop_filter.last().unwrap();
    assert!((last - 50.0 / FS).abs() < 1e-6, "loop filter {last}");
}

#[test]
fn test_afc_then_pll() {
    init_logging();
    let f0 = 300.0;
    let x: Vec<Complex64> = (0..6000)
        .map(|k| Complex64::from_polar(0.8, 2.0 * PI * f0 * k as f64 / FS + 1.0))
        .collect();
    let afc = cbb_afc(
        &x,
        &TrackingLoopConfig {
            noise_bandwidth: 500.0,
            clock_rate: FS,
            ..Default::default()
        },
    )
    .unwrap();
    let residual = discrim(&afc.mixed[3000..]).unwrap();
    let residual_hz = residual.last().copied().unwrap_or_default() * FS / (2.0 * PI);
    assert!(residual_hz.abs() < 0.5, "residual offset {residual_hz} Hz");

    let pll = cbb_pll(&afc.mixed[3000..], &pll_config()).unwrap();
    assert!(pll.detector[2900..].iter().all(|e| e.abs() < 1e-2));
}

#[test]
fn test_analog_models_agree_for_small_phase() {
    init_logging();
    let cfg = AnalogPllConfig {
        sample_rate: 1000.0,
        topology: LoopTopology::IntegratorLead,
        ..Default::default()
    };
    let theta: Vec<f64> = (0..2000).map(|k| 1e-3 * (k as f64 / 1000.0)).collect();
    let x: Vec<Complex64> = theta.iter().map(|&t| Complex64::from_polar(1.0, t)).collect();
    let real = pll1(&theta, &cfg).unwrap();
    let cbb = pll_cbb(&x, &cfg).unwrap();
    for (a, b) in real.phase_error.iter().zip(&cbb.phase_error) {
        assert!((a - b).abs() < 1e-9);
    }
}
