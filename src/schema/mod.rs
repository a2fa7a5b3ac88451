//! Schema module - Problem descriptions, solver configuration and result types.

mod config;
mod evolution;
mod solution;

pub use config::*;
pub use evolution::*;
pub use solution::*;
