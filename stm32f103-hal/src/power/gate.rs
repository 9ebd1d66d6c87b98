use crate::pac;

/// A register of per-peripheral clock enable bits.
///
/// GPIO ports must have their clock turned on before their registers
/// respond. Writes to a port with its clock off fail silently.
///
/// # Safety
/// [ClockGate::enable] may be called from several contexts at once and
/// must not lose any of their bits.
pub unsafe trait ClockGate {
    /// Turn on the clock behind `bit`, leaving every other bit alone.
    fn enable(&self, bit: u8);

    /// Is the clock behind `bit` on?
    fn is_enabled(&self, bit: u8) -> bool;
}

// safety: the read-modify-write happens in a critical section
unsafe impl ClockGate for pac::rcc::RegisterBlock {
    #[inline]
    fn enable(&self, bit: u8) {
        // APB2ENR also gates the timers, ADCs and USART1, whose drivers
        // don't share our port locks
        critical_section::with(|_cs| {
            let value = self.apb2enr.get();
            self.apb2enr.set(value | (1 << bit));
        });
    }

    #[inline]
    fn is_enabled(&self, bit: u8) -> bool {
        self.apb2enr.get() & (1 << bit) != 0
    }
}

#[cfg(test)]
mod test {
    use vcell::VolatileCell;

    use super::*;

    fn rcc() -> pac::rcc::RegisterBlock {
        pac::rcc::RegisterBlock {
            cr: VolatileCell::new(0),
            cfgr: VolatileCell::new(0),
            cir: VolatileCell::new(0),
            apb2rstr: VolatileCell::new(0),
            apb1rstr: VolatileCell::new(0),
            ahbenr: VolatileCell::new(0x14),
            apb2enr: VolatileCell::new(0),
            apb1enr: VolatileCell::new(0),
            bdcr: VolatileCell::new(0),
            csr: VolatileCell::new(0),
        }
    }

    #[test]
    fn enable_sets_only_its_bit() {
        let rcc = rcc();
        rcc.apb2enr.set(1 << pac::rcc::apb2enr::AFIOEN);

        rcc.enable(pac::rcc::apb2enr::IOPCEN);

        assert_eq!(0b1_0001, rcc.apb2enr.get());
        assert!(rcc.is_enabled(pac::rcc::apb2enr::IOPCEN));
        assert!(!rcc.is_enabled(pac::rcc::apb2enr::IOPAEN));
        assert_eq!(0, rcc.apb1enr.get());
    }

    #[test]
    fn enable_is_idempotent() {
        let rcc = rcc();
        rcc.enable(pac::rcc::apb2enr::IOPAEN);
        rcc.enable(pac::rcc::apb2enr::IOPAEN);
        assert_eq!(0b100, rcc.apb2enr.get());
    }
}
