//! Transfer module
//!
//! Materializes the selected paths in a cached working tree and moves them
//! to their destinations

pub mod executor;

pub use executor::*;
