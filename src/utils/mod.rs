//! Utility functions module
//!
//! Common path and filesystem helpers

pub mod fs;
pub mod path;

pub use fs::*;
pub use path::*;
