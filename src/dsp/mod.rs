//! Digital Signal Processing
//!
//! Per-sample primitives for the synchronization loops. Each one is a small
//! owned state struct; nothing here is shared between loops.

pub mod accumulator;
pub mod discriminator;
pub mod filter;
pub mod interpolator;
pub mod loop_filter;
pub mod nco;
pub mod normalize;
pub mod slicer;
pub mod ted;

// Re-export commonly used items
pub use accumulator::Accumulator;
pub use discriminator::{discrim, Discriminator};
pub use filter::{lfilter, IirFilter};
pub use interpolator::FarrowInterpolator;
pub use loop_filter::{loop_parms1, loop_parms2, loop_pull_out, LoopFilter1, LoopFilter2};
pub use nco::Nco;
pub use slicer::Slicer;
