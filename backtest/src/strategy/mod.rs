//! Strategy engine module
//!
//! Strategy definition, parameters and signal generation.

pub mod base;
pub mod implementations;
pub mod params;
pub mod registry;

pub use base::*;
pub use implementations::*;
pub use params::*;
pub use registry::*;
