//! Domain error types

use thiserror::Error;

/// Errors that can occur while configuring or running a synchronization loop
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Unsupported interpolator order {0}: must be 1, 2, or 3")]
    UnsupportedInterpolatorOrder(u8),

    #[error("Unsupported {family} modulation order {order}")]
    UnsupportedModulation { family: &'static str, order: u32 },

    #[error("Unsupported phase detector type {0}: must be 0, 1, or 2")]
    UnsupportedDetector(u8),

    #[error("Unsupported loop topology {0}: must be 1, 2, or 3")]
    UnsupportedLoopTopology(u8),

    #[error("Unsupported NCO width of {0} bits: must be 1 to 64")]
    UnsupportedBitWidth(u32),

    #[error("Invalid parameter {name} = {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("Discriminator input envelope is zero at sample {0}")]
    ZeroEnvelope(usize),

    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    #[error("Profile error: {0}")]
    Profile(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Reject a parameter that must be finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> SyncResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        log::warn!("rejecting {name} = {value}");
        Err(SyncError::InvalidParameter { name, value })
    }
}

/// Reject a parameter that must be finite and nonzero.
pub(crate) fn require_nonzero(name: &'static str, value: f64) -> SyncResult<f64> {
    if value.is_finite() && value != 0.0 {
        Ok(value)
    } else {
        log::warn!("rejecting {name} = {value}");
        Err(SyncError::InvalidParameter { name, value })
    }
}

/// Reject a parameter that must be finite.
pub(crate) fn require_finite(name: &'static str, value: f64) -> SyncResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        log::warn!("rejecting {name} = {value}");
        Err(SyncError::InvalidParameter { name, value })
    }
}
