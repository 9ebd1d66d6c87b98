//! Packing of per-pin configuration fields into CRL/CRH.
//!
//! Each pin owns a 4-bit field, `CNF[1:0] MODE[1:0]`. Pins 0 to 7 live
//! in CRL and pins 8 to 15 in CRH, at bit `4 * (pin % 8)`. Everything
//! here is pure, so the packing can be checked without hardware.

use super::{Config, PinMask, PinState, Pull, Speed};

/// One of the two configuration registers of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigHalf {
    /// CRL, pins 0 to 7.
    Low,
    /// CRH, pins 8 to 15.
    High,
}

/// The 4-bit field value for a configuration.
///
/// Pull is only meaningful for [Config::Input]. Whether the pull goes
/// up or down is not part of the field, see [pull_level].
pub const fn config_code(config: Config, pull: Pull, speed: Speed) -> u8 {
    let speed = speed as u8;
    match config {
        Config::Input => match pull {
            Pull::None => 0b0100,
            Pull::Up | Pull::Down => 0b1000,
        },
        Config::Analog => 0b0000,
        Config::OutputPushPull => speed,
        Config::OutputOpenDrain => 0b0100 | speed,
        Config::AlternatePushPull => 0b1000 | speed,
        Config::AlternateOpenDrain => 0b1100 | speed,
    }
}

/// The output register level that selects the pull direction.
///
/// An input with pull enabled pulls up when its output bit is 1 and
/// down when it is 0. Returns `None` when the output bit is not part of
/// the configuration.
pub const fn pull_level(config: Config, pull: Pull) -> Option<PinState> {
    match (config, pull) {
        (Config::Input, Pull::Up) => Some(PinState::High),
        (Config::Input, Pull::Down) => Some(PinState::Low),
        _ => None,
    }
}

/// A masked write to one register: clear some bits, then set some.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldUpdate {
    /// Every bit of every affected field.
    pub clear: u32,
    /// The new field values. Always inside `clear`.
    pub set: u32,
}

impl FieldUpdate {
    /// The register value after this update.
    #[inline(always)]
    pub const fn apply(&self, old: u32) -> u32 {
        (old & !self.clear) | self.set
    }
}

/// The updates needed to give every pin in a mask the same field value.
///
/// A half is `None` if no pin in the mask lives there. That register is
/// then neither read nor written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigUpdate {
    pub low: Option<FieldUpdate>,
    pub high: Option<FieldUpdate>,
}

impl ConfigUpdate {
    /// Compute the CRL/CRH updates that write `code` into the field of
    /// every pin in `mask`.
    pub const fn new(mask: PinMask, code: u8) -> Self {
        Self {
            low: field_update(field_lsbs(mask as u8), code),
            high: field_update(field_lsbs((mask >> 8) as u8), code),
        }
    }

    /// The update for one half, if any.
    #[inline(always)]
    pub const fn half(&self, half: ConfigHalf) -> Option<FieldUpdate> {
        match half {
            ConfigHalf::Low => self.low,
            ConfigHalf::High => self.high,
        }
    }
}

const fn field_update(lsbs: u32, code: u8) -> Option<FieldUpdate> {
    if lsbs == 0 {
        return None;
    }

    // multiplication distributes the field over every selected lsb; the
    // fields are 4 bits apart and the values fit in 4 bits, so nothing
    // carries into a neighbor
    Some(FieldUpdate {
        clear: lsbs.wrapping_mul(0b1111),
        set: lsbs.wrapping_mul((code & 0b1111) as u32),
    })
}

/// Move bit `i` of `pins` to bit `4 * i`, the low bit of pin `i`'s
/// field within one configuration register.
const fn field_lsbs(pins: u8) -> u32 {
    let mut lsbs = 0;
    let mut pin = 0;
    while pin < 8 {
        if pins & (1 << pin) != 0 {
            lsbs |= 1 << (4 * pin);
        }
        pin += 1;
    }
    lsbs
}
