//! Compute module - Surface reconstruction from height fields.

mod interpolation;
mod mesh;

pub use interpolation::*;
pub use mesh::*;
