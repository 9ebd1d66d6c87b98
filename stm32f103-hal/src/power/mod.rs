//! Interfaces for peripheral clock control.

mod gate;
pub use gate::*;
