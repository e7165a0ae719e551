//! Synchronization loops
//!
//! Closed loops built from the `dsp` primitives (PLL, AFC), the two batch
//! synchronizers (symbol timing, carrier phase), the analog-equivalent PLL
//! models, and the linear models used to check the digital loops.
//!
//! Every routine is a pure transformation of an input record plus a config
//! into owned output records. The control recurrences are serial; separate
//! records can be processed on separate threads.

pub mod afc;
pub mod analog_pll;
pub mod carrier_sync;
pub mod impair;
pub mod pll;
pub mod response;
pub mod symbol_sync;

use num_complex::Complex64;

use crate::domain::{SyncError, SyncResult};

pub use afc::{cbb_afc, AfcOutput, ComplexAfc};
pub use analog_pll::{pll1, pll_cbb, AnalogPllOutput};
pub use carrier_sync::{dd_carrier_sync, CarrierSyncOutput};
pub use pll::{cbb_pll, ComplexPll, PllOutput};
pub use symbol_sync::{nda_symb_sync, SymbolSyncOutput};

/// Reject records containing NaN or infinite samples
pub(crate) fn check_finite(x: &[Complex64]) -> SyncResult<()> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(k) => Err(SyncError::DegenerateSignal(format!(
            "non-finite input sample at index {k}"
        ))),
        None => Ok(()),
    }
}
