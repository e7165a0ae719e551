//! Hard symbol decisions
//!
//! The modulation is resolved into a `Slicer` once, when a loop is
//! configured; `decide` then runs per symbol without re-checking the order.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use num_complex::Complex64;

use crate::domain::{Modulation, SyncResult};

/// Nearest-point decision rule for one constellation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slicer {
    /// Antipodal on the real axis
    Bpsk,
    /// `(±1 ± j)/√2`
    Qpsk,
    /// Angle quantized to `order` levels on the unit circle
    Mpsk { order: u32 },
    /// Square QAM on the odd-integer grid with half-extent `x_m`
    Qam { x_m: f64 },
}

impl Slicer {
    pub fn new(modulation: Modulation) -> SyncResult<Self> {
        modulation.validate()?;
        Ok(match modulation {
            Modulation::Psk { order: 2 } => Self::Bpsk,
            Modulation::Psk { order: 4 } => Self::Qpsk,
            Modulation::Psk { order } => Self::Mpsk { order },
            Modulation::Qam { order: 2 } => Self::Qam { x_m: 1.0 },
            Modulation::Qam { order } => Self::Qam {
                x_m: (order as f64).sqrt() - 1.0,
            },
        })
    }

    pub fn decide(&self, z: Complex64) -> Complex64 {
        match *self {
            Self::Bpsk => Complex64::new(sign(z.re), 0.0),
            Self::Qpsk => Complex64::new(sign(z.re), sign(z.im)) * FRAC_1_SQRT_2,
            Self::Mpsk { order } => {
                let m = order as f64;
                let level = (z.arg() * m / (2.0 * PI)).round_ties_even().rem_euclid(m);
                Complex64::from_polar(1.0, 2.0 * PI * level / m)
            }
            Self::Qam { x_m } => {
                // Shift to quadrant one, round onto the grid, shift back
                let shifted = (z + Complex64::new(x_m, x_m)) / 2.0;
                let i = shifted.re.round_ties_even().clamp(0.0, x_m);
                let q = shifted.im.round_ties_even().clamp(0.0, x_m);
                Complex64::new(2.0 * i - x_m, 2.0 * q - x_m)
            }
        }
    }
}

/// Sign with `sign(0) == 0`
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
