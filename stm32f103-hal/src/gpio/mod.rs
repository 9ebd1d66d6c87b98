//! Interfaces for interacting with GPIO ports and pins.
//!
//! Every operation names a port by its index in a [Registry] and selects
//! pins with a 16-bit mask, bit `i` meaning pin `i`. Operations that
//! read-modify-write a port register hold that port's [SpinLock] for the
//! duration, so tasks and interrupt handlers can drive disjoint pins of
//! one port at the same time without losing each other's updates.
//!
//! ```no_run
//! use stm32f103_hal::gpio::{Config, PortId, Pull, PORTS};
//!
//! PORTS.initialize(PortId::C);
//! PORTS.configure_pin(PortId::C, 13, Config::OutputPushPull, Pull::None);
//! PORTS.toggle_pin(PortId::C, 13);
//! ```
//!
//! [SpinLock]: crate::sync::SpinLock

mod field;
pub use field::*;

mod regs;
pub use regs::*;

mod registry;
pub use registry::*;

mod port;

mod pin;
pub use pin::*;

mod hal02;
mod hal1;

#[cfg(test)]
pub(crate) mod sim;

/// Number of pins on each port.
pub const PINS_PER_PORT: u8 = 16;

/// A selection of pins on one port. Bit `i` is pin `i`.
pub type PinMask = u16;

/// Ports available on this chip, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PortId {
    A = 0,
    B,
    C,
    D,
    E,
    #[cfg(feature = "high-density")]
    F,
    #[cfg(feature = "high-density")]
    G,
}

impl From<PortId> for u8 {
    #[inline(always)]
    fn from(value: PortId) -> Self {
        value as u8
    }
}

/// Pin configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Config {
    /// Digital input, floating or with a pull resistor.
    Input,
    /// Software-controlled output, driven high and low.
    OutputPushPull,
    /// Software-controlled output, driven low only.
    OutputOpenDrain,
    /// Analog mode. Input and output drivers are disconnected.
    Analog,
    /// Peripheral-controlled output, driven high and low.
    AlternatePushPull,
    /// Peripheral-controlled output, driven low only.
    AlternateOpenDrain,
}

/// Weak pull resistor selection.
///
/// Only inputs have pull resistors on this chip. The pull is ignored for
/// every other configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// Output slew rate limit, used by output and alternate configurations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Speed {
    Max10MHz = 0b01,
    #[default]
    Max2MHz = 0b10,
    Max50MHz = 0b11,
}

/// Digital pin state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Low = 0,
    High = 1,
}

impl From<bool> for PinState {
    #[inline(always)]
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl core::ops::Not for PinState {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

impl PinState {
    /// Is the pin high?
    #[inline(always)]
    pub fn is_high(&self) -> bool {
        *self == Self::High
    }

    /// Is the pin low?
    #[inline(always)]
    pub fn is_low(&self) -> bool {
        *self == Self::Low
    }

    /// All-ones or all-zeros, for writing through a mask.
    #[inline(always)]
    pub(crate) fn fill(self) -> PinMask {
        match self {
            Self::High => PinMask::MAX,
            Self::Low => 0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn port_ids_are_registry_indices() {
        assert_eq!(0, u8::from(PortId::A));
        assert_eq!(2, u8::from(PortId::C));
        assert_eq!(4, u8::from(PortId::E));
    }

    #[test]
    fn pin_state() {
        assert_eq!(PinState::High, PinState::from(true));
        assert_eq!(PinState::Low, !PinState::High);
        assert!(PinState::Low.is_low());
        assert_eq!(0xffff, PinState::High.fill());
        assert_eq!(0, PinState::Low.fill());
    }
}
