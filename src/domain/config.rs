//! Loop configuration
//!
//! One config struct per routine, plus a `SyncProfile` bundling all of them
//! under a name so a complete receiver setup can be saved and reloaded.
//! Missing fields in a JSON document fall back to the defaults below.

use serde::{Deserialize, Serialize};

use super::error::{require_finite, require_nonzero, require_positive, SyncError, SyncResult};
use super::types::{InterpolatorOrder, LoopTopology, Modulation, PhaseDetector};

/// Largest phase accumulator the NCO supports
pub const MAX_NCO_BITS: u32 = 64;

/// Largest TED smoothing half-width `L`
pub const MAX_SMOOTHING_HALF_WIDTH: usize = 4096;

/// Non-data-aided symbol timing recovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolSyncConfig {
    /// Nominal samples per symbol `Ns`
    pub samples_per_symbol: usize,
    /// TED smoothing half-width `L`; the smoother averages `2L + 1` outputs
    pub smoothing_half_width: usize,
    /// Loop bandwidth as a fraction of the symbol rate, `BnTs`
    pub loop_bandwidth: f64,
    /// Loop damping factor
    pub damping: f64,
    pub interpolator: InterpolatorOrder,
}

impl Default for SymbolSyncConfig {
    fn default() -> Self {
        Self {
            samples_per_symbol: 4,
            smoothing_half_width: 2,
            loop_bandwidth: 0.01,
            damping: 0.707,
            interpolator: InterpolatorOrder::Cubic,
        }
    }
}

impl SymbolSyncConfig {
    pub fn validate(&self) -> SyncResult<()> {
        if self.samples_per_symbol == 0 {
            log::warn!("samples_per_symbol must be at least 1");
            return Err(SyncError::InvalidParameter {
                name: "samples_per_symbol",
                value: 0.0,
            });
        }
        if self.smoothing_half_width > MAX_SMOOTHING_HALF_WIDTH {
            log::warn!(
                "smoothing_half_width {} exceeds {MAX_SMOOTHING_HALF_WIDTH}",
                self.smoothing_half_width
            );
            return Err(SyncError::InvalidParameter {
                name: "smoothing_half_width",
                value: self.smoothing_half_width as f64,
            });
        }
        require_positive("loop_bandwidth", self.loop_bandwidth)?;
        require_positive("damping", self.damping)?;
        Ok(())
    }
}

/// Decision-directed carrier phase recovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarrierSyncConfig {
    pub modulation: Modulation,
    /// Loop bandwidth as a fraction of the symbol rate, `BnTs`
    pub loop_bandwidth: f64,
    pub damping: f64,
    pub detector: PhaseDetector,
    /// Force the phase estimate back to zero after every symbol
    pub open_loop: bool,
}

impl Default for CarrierSyncConfig {
    fn default() -> Self {
        Self {
            modulation: Modulation::default(),
            loop_bandwidth: 0.02,
            damping: 0.707,
            detector: PhaseDetector::default(),
            open_loop: false,
        }
    }
}

impl CarrierSyncConfig {
    pub fn validate(&self) -> SyncResult<()> {
        self.modulation.validate()?;
        require_positive("loop_bandwidth", self.loop_bandwidth)?;
        require_positive("damping", self.damping)?;
        Ok(())
    }
}

/// Fixed-point numerically controlled oscillator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NcoConfig {
    /// Center frequency in Hz
    pub center_frequency: f64,
    /// Clock rate in Hz
    pub sample_rate: f64,
    /// Control gain `kc`
    pub gain: f64,
    /// Initial phase accumulator value
    pub initial_state: u64,
    /// Accumulator width in bits
    pub bit_width: u32,
}

impl Default for NcoConfig {
    fn default() -> Self {
        Self {
            center_frequency: 0.0,
            sample_rate: 100e3,
            gain: 1.0,
            initial_state: 0,
            bit_width: 32,
        }
    }
}

impl NcoConfig {
    pub fn validate(&self) -> SyncResult<()> {
        if self.bit_width == 0 || self.bit_width > MAX_NCO_BITS {
            log::warn!("NCO width {} is out of range", self.bit_width);
            return Err(SyncError::UnsupportedBitWidth(self.bit_width));
        }
        require_finite("center_frequency", self.center_frequency)?;
        require_positive("sample_rate", self.sample_rate)?;
        require_finite("gain", self.gain)?;
        Ok(())
    }
}

/// Analog-equivalent PLL model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalogPllConfig {
    /// Simulation sampling rate in Hz
    pub sample_rate: f64,
    pub topology: LoopTopology,
    /// VCO gain in Hz/V
    pub vco_gain: f64,
    /// Natural frequency in Hz (cutoff frequency for the first-order loop)
    pub natural_frequency: f64,
    /// Damping factor, used by the second-order topologies
    pub damping: f64,
    /// Sinusoidal rather than linear phase detector (real-phase model only)
    pub nonlinear: bool,
}

impl Default for AnalogPllConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000.0,
            topology: LoopTopology::default(),
            vco_gain: 1.0,
            natural_frequency: 10.0,
            damping: 0.707,
            nonlinear: false,
        }
    }
}

impl AnalogPllConfig {
    pub fn validate(&self) -> SyncResult<()> {
        require_positive("sample_rate", self.sample_rate)?;
        require_nonzero("vco_gain", self.vco_gain)?;
        require_positive("natural_frequency", self.natural_frequency)?;
        if self.topology != LoopTopology::FirstOrder {
            require_positive("damping", self.damping)?;
        }
        Ok(())
    }
}

/// Sample-by-sample PLL and AFC settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingLoopConfig {
    /// Loop noise-equivalent bandwidth in Hz
    pub noise_bandwidth: f64,
    /// Detector gain applied ahead of the loop filter
    pub detector_gain: f64,
    /// NCO center frequency in Hz
    pub center_frequency: f64,
    /// Loop clock rate in Hz
    pub clock_rate: f64,
    /// Hold the NCO at its center frequency
    pub open_loop: bool,
}

impl Default for TrackingLoopConfig {
    fn default() -> Self {
        Self {
            noise_bandwidth: 100.0,
            detector_gain: 1.0,
            center_frequency: 0.0,
            clock_rate: 100e3,
            open_loop: false,
        }
    }
}

impl TrackingLoopConfig {
    pub fn validate(&self) -> SyncResult<()> {
        require_positive("noise_bandwidth", self.noise_bandwidth)?;
        require_nonzero("detector_gain", self.detector_gain)?;
        require_finite("center_frequency", self.center_frequency)?;
        require_positive("clock_rate", self.clock_rate)?;
        Ok(())
    }
}

/// A saved synchronization profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncProfile {
    /// Profile name (e.g., "Default", "QPSK 4x oversampled")
    pub name: String,
    pub symbol_sync: SymbolSyncConfig,
    pub carrier_sync: CarrierSyncConfig,
    pub nco: NcoConfig,
    pub analog_pll: AnalogPllConfig,
    pub tracking: TrackingLoopConfig,
}

impl Default for SyncProfile {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            symbol_sync: SymbolSyncConfig::default(),
            carrier_sync: CarrierSyncConfig::default(),
            nco: NcoConfig::default(),
            analog_pll: AnalogPllConfig::default(),
            tracking: TrackingLoopConfig::default(),
        }
    }
}

impl SyncProfile {
    pub fn validate(&self) -> SyncResult<()> {
        self.symbol_sync.validate()?;
        self.carrier_sync.validate()?;
        self.nco.validate()?;
        self.analog_pll.validate()?;
        self.tracking.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_is_valid() {
        let profile = SyncProfile::default();
        assert_eq!(profile.name, "Default");
        assert_eq!(profile.symbol_sync.samples_per_symbol, 4);
        assert_eq!(profile.carrier_sync.damping, 0.707);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn zero_damping_is_rejected() {
        let config = SymbolSyncConfig {
            damping: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SyncError::InvalidParameter { name: "damping", .. })
        ));
    }

    #[test]
    fn oversized_smoothing_window_is_rejected() {
        for half_width in [MAX_SMOOTHING_HALF_WIDTH + 1, usize::MAX / 2 + 1] {
            let config = SymbolSyncConfig {
                smoothing_half_width: half_width,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(SyncError::InvalidParameter {
                    name: "smoothing_half_width",
                    ..
                })
            ));
        }
        let widest = SymbolSyncConfig {
            smoothing_half_width: MAX_SMOOTHING_HALF_WIDTH,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());
    }

    #[test]
    fn nco_width_beyond_64_bits_is_rejected() {
        let config = NcoConfig {
            bit_width: 65,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SyncError::UnsupportedBitWidth(65))
        ));
    }

    #[test]
    fn first_order_analog_loop_ignores_damping() {
        let config = AnalogPllConfig {
            topology: LoopTopology::FirstOrder,
            damping: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let json = r#"{"name":"Bench","carrier_sync":{"open_loop":true}}"#;
        let profile: SyncProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Bench");
        assert!(profile.carrier_sync.open_loop);
        assert_eq!(profile.carrier_sync.loop_bandwidth, 0.02);
        assert_eq!(profile.nco.bit_width, 32);
    }

    #[test]
    fn unsupported_qam_order_fails_validation() {
        let mut profile = SyncProfile::default();
        profile.carrier_sync.modulation = Modulation::Qam { order: 8 };
        assert!(matches!(
            profile.validate(),
            Err(SyncError::UnsupportedModulation { order: 8, .. })
        ));
    }
}
