#![cfg_attr(not(test), no_std)]

/// Register access crate, providing raw, unconstrained access to
/// peripherals.
pub use stm32f103 as pac;

#[macro_use]
pub mod fault;

pub mod gpio;
pub mod power;
pub mod sync;
