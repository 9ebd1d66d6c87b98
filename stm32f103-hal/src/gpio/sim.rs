//! Simulated ports for host tests.
//!
//! [Loopback] keeps its registers in atomics and feeds the output
//! register back into the input register, like a port with every pin
//! strapped to itself. Config and output accesses are separate loads and
//! stores, so an unlocked read-modify-write can lose updates just as it
//! would on hardware.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::pac;
use crate::power::ClockGate;

use super::{ConfigHalf, PinMask, Port, PortRegisters, Registry};

/// Ports in a simulated registry.
pub const PORTS: usize = 3;

/// A port whose input register reads back its output register.
///
/// `SET_RESET` selects whether the port has a bit set/reset register.
#[derive(Debug)]
pub struct Loopback<const SET_RESET: bool> {
    crl: AtomicU32,
    crh: AtomicU32,
    odr: AtomicU32,
    writes: AtomicU32,
    set_resets: AtomicU32,
}

impl<const SET_RESET: bool> Loopback<SET_RESET> {
    pub const fn new() -> Self {
        Self {
            crl: AtomicU32::new(pac::gpio::CR_RESET),
            crh: AtomicU32::new(pac::gpio::CR_RESET),
            odr: AtomicU32::new(0),
            writes: AtomicU32::new(0),
            set_resets: AtomicU32::new(0),
        }
    }

    /// Number of plain register writes so far.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of set/reset writes so far.
    pub fn set_resets(&self) -> u32 {
        self.set_resets.load(Ordering::SeqCst)
    }

    fn cr(&self, half: ConfigHalf) -> &AtomicU32 {
        match half {
            ConfigHalf::Low => &self.crl,
            ConfigHalf::High => &self.crh,
        }
    }
}

// safety: every register is an atomic
unsafe impl<const SET_RESET: bool> PortRegisters for Loopback<SET_RESET> {
    const HAS_SET_RESET: bool = SET_RESET;

    fn config(&self, half: ConfigHalf) -> u32 {
        self.cr(half).load(Ordering::SeqCst)
    }

    fn set_config(&self, half: ConfigHalf, bits: u32) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cr(half).store(bits, Ordering::SeqCst);
    }

    fn output(&self) -> PinMask {
        self.odr.load(Ordering::SeqCst) as PinMask
    }

    fn set_output(&self, bits: PinMask) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.odr.store(u32::from(bits), Ordering::SeqCst);
    }

    fn input(&self) -> PinMask {
        self.output()
    }

    fn set_reset(&self, set: PinMask, reset: PinMask) {
        assert!(SET_RESET, "set/reset on a port without BSRR");
        self.set_resets.fetch_add(1, Ordering::SeqCst);
        // one atomic update, like the hardware
        let _ = self
            .odr
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |odr| {
                Some((odr & !u32::from(reset)) | u32::from(set))
            });
    }
}

/// A clock gate that counts how often it is written.
#[derive(Debug, Default)]
pub struct CountingGate {
    enabled: AtomicU32,
    writes: AtomicU32,
}

impl CountingGate {
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }
}

// safety: the enable bits are one atomic
unsafe impl ClockGate for CountingGate {
    fn enable(&self, bit: u8) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.enabled.fetch_or(1 << bit, Ordering::SeqCst);
    }

    fn is_enabled(&self, bit: u8) -> bool {
        self.enabled.load(Ordering::SeqCst) & (1 << bit) != 0
    }
}

/// The clock bit for simulated port `index`.
pub const fn gate_bit(index: u8) -> u8 {
    pac::rcc::apb2enr::IOPAEN + index
}

pub type SimRegistry<const SET_RESET: bool> = Registry<Loopback<SET_RESET>, CountingGate, PORTS>;

/// A fresh registry of simulated ports. Leaked, like a `static`.
pub fn registry<const SET_RESET: bool>() -> &'static SimRegistry<SET_RESET> {
    fn port<const SET_RESET: bool>(index: u8) -> Port<Loopback<SET_RESET>> {
        Port::new(Box::leak(Box::new(Loopback::new())), gate_bit(index))
    }

    let gate = Box::leak(Box::<CountingGate>::default());
    Box::leak(Box::new(Registry::new(gate, [port(0), port(1), port(2)])))
}
