//! Compute module - Geometry, the planning environment and the solvers.

mod environment;
mod geometry;
mod search;

pub mod evolution;

pub use environment::*;
pub use geometry::*;
pub use search::*;
