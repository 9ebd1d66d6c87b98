use crate::fault::{fail, Fault};
use crate::pac;

use super::{ConfigHalf, PinMask};

/// The registers of one GPIO port, as the drivers need them.
///
/// This is the seam between the drivers and the hardware: the chip's
/// register block implements it over MMIO, and tests implement it over
/// plain memory. Implementations only move values in and out. Locking
/// is the caller's job.
///
/// # Safety
/// One port is shared by every context. Implementations must allow any
/// number of concurrent callers, with at most one of them writing
/// anything but [PortRegisters::set_reset] at a time.
pub unsafe trait PortRegisters {
    /// Whether [PortRegisters::set_reset] is backed by a write-only,
    /// self-masking register, making it atomic without a lock.
    const HAS_SET_RESET: bool;

    /// Read a configuration register.
    fn config(&self, half: ConfigHalf) -> u32;

    /// Write a configuration register.
    fn set_config(&self, half: ConfigHalf, bits: u32);

    /// Read the output register.
    fn output(&self) -> PinMask;

    /// Write the output register.
    fn set_output(&self, bits: PinMask);

    /// Read the input register.
    fn input(&self) -> PinMask;

    /// Drive `set` pins high and `reset` pins low in one write. If a pin
    /// is in both, it goes high.
    ///
    /// Only called when [PortRegisters::HAS_SET_RESET] is true.
    #[track_caller]
    fn set_reset(&self, set: PinMask, reset: PinMask) {
        let _ = (set, reset);
        fail(Fault::NotSupported)
    }
}

// safety: volatile accesses to MMIO, single-register writes are atomic
unsafe impl PortRegisters for pac::gpio::RegisterBlock {
    const HAS_SET_RESET: bool = true;

    #[inline(always)]
    fn config(&self, half: ConfigHalf) -> u32 {
        match half {
            ConfigHalf::Low => self.crl.get(),
            ConfigHalf::High => self.crh.get(),
        }
    }

    #[inline(always)]
    fn set_config(&self, half: ConfigHalf, bits: u32) {
        match half {
            ConfigHalf::Low => self.crl.set(bits),
            ConfigHalf::High => self.crh.set(bits),
        }
    }

    #[inline(always)]
    fn output(&self) -> PinMask {
        self.odr.get() as PinMask
    }

    #[inline(always)]
    fn set_output(&self, bits: PinMask) {
        self.odr.set(u32::from(bits));
    }

    #[inline(always)]
    fn input(&self) -> PinMask {
        self.idr.get() as PinMask
    }

    #[inline(always)]
    fn set_reset(&self, set: PinMask, reset: PinMask) {
        // BSRR: upper half resets, lower half sets, set wins
        self.bsrr.set((u32::from(reset) << 16) | u32::from(set));
    }
}
