//! loopsync
//!
//! Synchronization for digital receivers: numerically controlled
//! oscillators, loop filters and discriminators, PLL and AFC tracking loops,
//! non-data-aided symbol timing recovery, decision-directed carrier phase
//! recovery, and analog-equivalent PLL models for checking the digital loops.
//!
//! ## Architecture
//!
//! - `domain/` - Pure types, configuration and errors, no I/O
//! - `dsp/` - Per-sample primitives (NCO, loop filters, discriminator,
//!   interpolator, TED, slicer, IIR filter)
//! - `sync/` - Loops and batch synchronizers built on the primitives
//! - `profile` - Save/load of named configuration profiles as JSON
//!
//! Every batch routine validates its configuration once, then runs a serial
//! control recurrence over the input record and returns owned output
//! records.

pub mod domain;
pub mod dsp;
pub mod profile;
pub mod sync;

pub use domain::{Sample, SyncError, SyncProfile, SyncResult};
pub use profile::ProfileStore;
