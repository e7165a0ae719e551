//! Core domain types
//!
//! Closed enumerations for every option that selects an algorithm variant.
//! Integer codes (as used in configuration files and older call sites)
//! convert through `TryFrom`, failing with the matching configuration error.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::error::{SyncError, SyncResult};

/// Complex baseband sample
pub type Sample = Complex64;

/// Fractional-delay interpolator order used by symbol timing recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolatorOrder {
    /// Piecewise linear
    Linear,
    /// Piecewise parabolic, Farrow form with alpha = 1/2
    Parabolic,
    /// Piecewise cubic, Farrow form
    Cubic,
}

impl InterpolatorOrder {
    /// Polynomial order in `mu`
    pub fn degree(self) -> usize {
        match self {
            Self::Linear => 1,
            Self::Parabolic => 2,
            Self::Cubic => 3,
        }
    }
}

impl TryFrom<u8> for InterpolatorOrder {
    type Error = SyncError;

    fn try_from(order: u8) -> SyncResult<Self> {
        match order {
            1 => Ok(Self::Linear),
            2 => Ok(Self::Parabolic),
            3 => Ok(Self::Cubic),
            other => {
                log::warn!("interpolator order {other} is not supported");
                Err(SyncError::UnsupportedInterpolatorOrder(other))
            }
        }
    }
}

/// Modulation family and order used for decision-directed carrier recovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Modulation {
    /// M-ary phase-shift keying: M = 2, 4, or any M > 4
    Psk { order: u32 },
    /// Square QAM: M = 2, 4, 16, 64, or 256
    Qam { order: u32 },
}

impl Modulation {
    pub fn order(&self) -> u32 {
        match *self {
            Self::Psk { order } | Self::Qam { order } => order,
        }
    }

    pub fn family(&self) -> &'static str {
        match self {
            Self::Psk { .. } => "PSK",
            Self::Qam { .. } => "QAM",
        }
    }

    /// Check that the order is one the decision logic knows how to slice
    pub fn validate(&self) -> SyncResult<()> {
        let supported = match *self {
            Self::Psk { order } => order == 2 || order >= 4,
            Self::Qam { order } => matches!(order, 2 | 4 | 16 | 64 | 256),
        };
        if supported {
            Ok(())
        } else {
            log::warn!("{} order {} is not supported", self.family(), self.order());
            Err(SyncError::UnsupportedModulation {
                family: self.family(),
                order: self.order(),
            })
        }
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Self::Psk { order: 4 }
    }
}

/// Carrier phase error detector law
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDetector {
    /// `Im(z')·Re(a) − Re(z')·Im(a)`
    #[default]
    MaxLikelihood,
    /// Wrapped angle difference `arg(z') − arg(a)`
    Heuristic,
    /// `Im(z'/a)`, suited to QAM
    QamRatio,
}

impl TryFrom<u8> for PhaseDetector {
    type Error = SyncError;

    fn try_from(code: u8) -> SyncResult<Self> {
        match code {
            0 => Ok(Self::MaxLikelihood),
            1 => Ok(Self::Heuristic),
            2 => Ok(Self::QamRatio),
            other => {
                log::warn!("phase detector type {other} is not supported");
                Err(SyncError::UnsupportedDetector(other))
            }
        }
    }
}

/// Continuous-time loop filter topology for the analog PLL models
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopTopology {
    /// `F(s) = K_LF`, a first-order loop
    FirstOrder,
    /// `F(s) = (1 + s·tau2) / (s·tau1)`, a type II loop
    #[default]
    IntegratorLead,
    /// `F(s) = (1 + s·tau2) / (1 + s·tau1)`
    LowpassLead,
}

impl TryFrom<u8> for LoopTopology {
    type Error = SyncError;

    fn try_from(code: u8) -> SyncResult<Self> {
        match code {
            1 => Ok(Self::FirstOrder),
            2 => Ok(Self::IntegratorLead),
            3 => Ok(Self::LowpassLead),
            other => {
                log::warn!("loop topology {other} is not supported");
                Err(SyncError::UnsupportedLoopTopology(other))
            }
        }
    }
}

/// Output scaling of the frequency discriminator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnits {
    /// Hz, relative to the discriminator clock
    #[default]
    Hz,
    /// Cycles per sample
    Normalized,
}

/// How `loop_parms1` interprets its bandwidth argument
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandwidthMode {
    /// Noise-equivalent bandwidth Bn
    #[default]
    NoiseEquivalent,
    /// 3 dB bandwidth of the equivalent first-order lowpass
    ThreeDb,
}
