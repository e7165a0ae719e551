//! Core domain types
//!
//! Pure types with no I/O dependencies: errors, closed option enums, and the
//! per-routine configuration structs.

pub mod config;
pub mod error;
pub mod types;

pub use config::*;
pub use error::*;
pub use types::*;
