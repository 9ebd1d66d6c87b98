use crate::power::ClockGate;

use super::{
    config_code, pull_level, Config, ConfigHalf, ConfigUpdate, PinMask, PortRegisters, Pull,
    Registry, Speed,
};

// Every read-modify-write below holds the port lock from the read to the
// write. Two contexts changing disjoint pins of the same register would
// otherwise lose one of the updates.

/// Drive the pins in `mask` to the matching bits of `level`. The caller
/// holds the port lock.
///
/// With a set/reset register only the selected bits are written, so a
/// lock-free [Registry::set] or [Registry::clear] on another pin that
/// lands between our read and this store is kept.
#[inline(always)]
fn store_output<R: PortRegisters>(regs: &R, mask: PinMask, level: PinMask) {
    if R::HAS_SET_RESET {
        regs.set_reset(level & mask, !level & mask);
    } else {
        regs.set_output((regs.output() & !mask) | (level & mask));
    }
}
impl<R, G, const N: usize> Registry<R, G, N>
where
    R: PortRegisters,
    G: ClockGate,
{
    /// Configure every pin in `mask`, at the default output speed.
    ///
    /// Pins outside `mask` keep their configuration bit for bit.
    #[track_caller]
    pub fn configure(&self, port: impl Into<u8>, mask: PinMask, config: Config, pull: Pull) {
        self.configure_with_speed(port, mask, config, pull, Speed::default());
    }

    /// Configure every pin in `mask`.
    ///
    /// `speed` only matters for output and alternate configurations.
    /// For inputs with a pull resistor, the output bits of the selected
    /// pins are also written, since they choose the pull direction.
    #[track_caller]
    pub fn configure_with_speed(
        &self,
        port: impl Into<u8>,
        mask: PinMask,
        config: Config,
        pull: Pull,
        speed: Speed,
    ) {
        let port = self.lookup(port);
        if mask == 0 {
            return;
        }
        let update = ConfigUpdate::new(mask, config_code(config, pull, speed));
        let regs = port.regs();

        let _guard = port.lock();
        for half in [ConfigHalf::Low, ConfigHalf::High] {
            if let Some(field) = update.half(half) {
                regs.set_config(half, field.apply(regs.config(half)));
            }
        }
        if let Some(level) = pull_level(config, pull) {
            store_output(regs, mask, level.fill());
        }
    }

    /// Write `level` to the output bits selected by `mask`.
    #[track_caller]
    pub fn write(&self, port: impl Into<u8>, mask: PinMask, level: PinMask) {
        let port = self.lookup(port);
        let regs = port.regs();

        let _guard = port.lock();
        store_output(regs, mask, level);
    }

    /// Drive the pins in `mask` high.
    #[track_caller]
    pub fn set(&self, port: impl Into<u8>, mask: PinMask) {
        let port = self.lookup(port);
        let regs = port.regs();

        if R::HAS_SET_RESET {
            regs.set_reset(mask, 0);
        } else {
            let _guard = port.lock();
            regs.set_output(regs.output() | mask);
        }
    }

    /// Drive the pins in `mask` low.
    #[track_caller]
    pub fn clear(&self, port: impl Into<u8>, mask: PinMask) {
        let port = self.lookup(port);
        let regs = port.regs();

        if R::HAS_SET_RESET {
            regs.set_reset(0, mask);
        } else {
            let _guard = port.lock();
            regs.set_output(regs.output() & !mask);
        }
    }

    /// Invert the output of the pins in `mask`.
    ///
    /// This always locks: the new value depends on the old one, even
    /// when the final write goes through the set/reset register.
    #[track_caller]
    pub fn toggle(&self, port: impl Into<u8>, mask: PinMask) {
        let port = self.lookup(port);
        let regs = port.regs();

        let _guard = port.lock();
        store_output(regs, mask, !regs.output());
    }

    /// Read the input level of the pins in `mask`. Unselected bits are 0.
    ///
    /// Reads don't lock. The result reflects the pins at some moment
    /// during the call.
    #[track_caller]
    pub fn read(&self, port: impl Into<u8>, mask: PinMask) -> PinMask {
        self.lookup(port).regs().input() & mask
    }

    /// Read back the output register bits selected by `mask`.
    #[track_caller]
    pub fn output(&self, port: impl Into<u8>, mask: PinMask) -> PinMask {
        self.lookup(port).regs().output() & mask
    }
}
