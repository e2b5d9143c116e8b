//! Schema module - Configuration and grid types for replayed simulations.

mod config;
mod grid;

pub use config::*;
pub use grid::*;
