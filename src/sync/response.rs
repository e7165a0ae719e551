//! Linear models of the type II digital PLL
//!
//! The phase-error transfer function of the second-order loop built from
//! [`loop_parms2`](crate::dsp::loop_filter::loop_parms2) gains,
//! `He(z) = (1 - z⁻¹)² / (1 - (2 - k1) z⁻¹ + (1 - k1 + k2) z⁻²)`, and its
//! responses to a phase step and a frequency step.

use std::f64::consts::PI;

use crate::domain::{require_positive, SyncResult};
use crate::dsp::filter::lfilter;
use crate::dsp::loop_filter::loop_parms2;

/// Numerator and denominator coefficients of the loop error function
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorTransfer {
    pub b: [f64; 3],
    pub a: [f64; 3],
}

/// Error transfer function coefficients for loop gains `(k1, k2)`
pub fn hetran_v1(k1: f64, k2: f64) -> ErrorTransfer {
    ErrorTransfer {
        b: [1.0, -2.0, 1.0],
        a: [1.0, -(2.0 - k1), 1.0 - k1 + k2],
    }
}

fn error_transfer(bn: f64, zeta: f64, fs: f64) -> SyncResult<ErrorTransfer> {
    let (k1, k2) = loop_parms2(bn, zeta, 1.0, fs)?;
    let h = hetran_v1(k1, k2);
    log::debug!("loop error denominator: {:?}", h.a);
    Ok(h)
}

/// Phase error, in radians, after a one-cycle phase step at sample 0
pub fn phi_phase_step(len: usize, bn: f64, zeta: f64, fs: f64) -> SyncResult<Vec<f64>> {
    let h = error_transfer(bn, zeta, fs)?;
    let step = vec![1.0; len];
    let phi = lfilter(&h.b, &h.a, &step)?;
    Ok(phi.into_iter().map(|v| 2.0 * PI * v).collect())
}

/// Phase error, in radians, after a 1 Hz frequency step at sample 0
pub fn phi_freq_step(len: usize, bn: f64, zeta: f64, fs: f64) -> SyncResult<Vec<f64>> {
    require_positive("fs", fs)?;
    let h = error_transfer(bn, zeta, fs)?;
    let ramp: Vec<f64> = (0..len).map(|n| n as f64).collect();
    let phi = lfilter(&h.b, &h.a, &ramp)?;
    Ok(phi.into_iter().map(|v| 2.0 * PI / fs * v).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SyncError;

    #[test]
    fn test_error_function_has_double_zero_at_dc() {
        let h = hetran_v1(0.1, 0.01);
        assert_eq!(h.b.iter().sum::<f64>(), 0.0);
        assert_eq!(h.a, [1.0, -1.9, 0.91]);
    }

    #[test]
    fn test_phase_step_response_settles_to_zero() {
        let phi = phi_phase_step(3000, 10.0, 0.707, 1000.0).unwrap();
        assert_eq!(phi.len(), 3000);
        assert!((phi[0] - 2.0 * PI).abs() < 1e-12, "initial error is the full step");
        assert!(phi[2999].abs() < 1e-6, "residual {}", phi[2999]);
    }

    #[test]
    fn test_frequency_step_response_settles_to_zero() {
        let fs = 1000.0;
        let phi = phi_freq_step(3000, 10.0, 0.707, fs).unwrap();
        assert_eq!(phi[0], 0.0);
        assert!((phi[1] - 2.0 * PI / fs).abs() < 1e-12);
        let peak = phi.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        assert!(peak > 0.01);
        assert!(phi[2999].abs() < 1e-6, "type II loop tracks a ramp");
    }

    #[test]
    fn test_bad_damping_is_rejected() {
        assert!(matches!(
            phi_phase_step(10, 10.0, 0.0, 1000.0),
            Err(SyncError::InvalidParameter { name: "zeta", .. })
        ));
    }
}
