use crate::fault::Fault;
use crate::power::ClockGate;

use super::{Config, PinMask, PinState, PortRegisters, Pull, Registry, PINS_PER_PORT};

/// The one-bit mask for `pin`.
#[inline(always)]
#[track_caller]
fn pin_mask(pin: u8) -> PinMask {
    hal_assert!(pin < PINS_PER_PORT, Fault::InvalidParameter);
    1 << pin
}

// Single pin forms of the port operations. These add no locking of their
// own.
impl<R, G, const N: usize> Registry<R, G, N>
where
    R: PortRegisters,
    G: ClockGate,
{
    #[track_caller]
    pub fn configure_pin(&self, port: impl Into<u8>, pin: u8, config: Config, pull: Pull) {
        self.configure(port, pin_mask(pin), config, pull);
    }

    #[track_caller]
    pub fn write_pin(&self, port: impl Into<u8>, pin: u8, state: PinState) {
        let mask = pin_mask(pin);
        self.write(port, mask, state.fill());
    }

    #[track_caller]
    pub fn set_pin(&self, port: impl Into<u8>, pin: u8) {
        self.set(port, pin_mask(pin));
    }

    #[track_caller]
    pub fn clear_pin(&self, port: impl Into<u8>, pin: u8) {
        self.clear(port, pin_mask(pin));
    }

    #[track_caller]
    pub fn toggle_pin(&self, port: impl Into<u8>, pin: u8) {
        self.toggle(port, pin_mask(pin));
    }

    #[track_caller]
    pub fn read_pin(&self, port: impl Into<u8>, pin: u8) -> PinState {
        let bits = self.read(port, pin_mask(pin));
        PinState::from((bits >> pin) & 1 != 0)
    }

    /// A handle to one pin, for drivers written against embedded-hal.
    ///
    /// The port and pin are checked here, once. The handle doesn't own
    /// the pin or change its configuration, so configure it first.
    #[track_caller]
    pub fn pin(&self, port: impl Into<u8>, pin: u8) -> Pin<'_, R, G, N> {
        let port = port.into();
        let _ = self.lookup(port);
        Pin {
            ports: self,
            port,
            mask: pin_mask(pin),
        }
    }
}

/// One pin of a [Registry].
pub struct Pin<'a, R, G, const N: usize> {
    ports: &'a Registry<R, G, N>,
    port: u8,
    mask: PinMask,
}

impl<'a, R, G, const N: usize> Pin<'a, R, G, N>
where
    R: PortRegisters,
    G: ClockGate,
{
    /// The index of this pin's port.
    #[inline(always)]
    pub fn port(&self) -> u8 {
        self.port
    }

    /// The index of this pin within its port.
    #[inline(always)]
    pub fn pin(&self) -> u8 {
        self.mask.trailing_zeros() as u8
    }

    /// Read the input level.
    #[inline(always)]
    pub fn read(&self) -> PinState {
        PinState::from(self.ports.read(self.port, self.mask) != 0)
    }

    #[inline(always)]
    pub fn is_high(&self) -> bool {
        self.read().is_high()
    }

    #[inline(always)]
    pub fn is_low(&self) -> bool {
        self.read().is_low()
    }

    /// The level this pin is being driven to.
    #[inline(always)]
    pub fn get_state(&self) -> PinState {
        PinState::from(self.ports.output(self.port, self.mask) != 0)
    }

    #[inline(always)]
    pub fn is_set_high(&self) -> bool {
        self.get_state().is_high()
    }

    #[inline(always)]
    pub fn is_set_low(&self) -> bool {
        self.get_state().is_low()
    }

    #[inline(always)]
    pub fn set_state(&mut self, state: PinState) {
        match state {
            PinState::High => self.set_high(),
            PinState::Low => self.set_low(),
        }
    }

    #[inline(always)]
    pub fn set_high(&mut self) {
        self.ports.set(self.port, self.mask);
    }

    #[inline(always)]
    pub fn set_low(&mut self) {
        self.ports.clear(self.port, self.mask);
    }

    #[inline(always)]
    pub fn toggle(&mut self) {
        self.ports.toggle(self.port, self.mask);
    }
}

impl<'a, R, G, const N: usize> core::fmt::Debug for Pin<'a, R, G, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_tuple("Pin")
            .field(&self.port)
            .field(&self.mask.trailing_zeros())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<'a, R, G, const N: usize> defmt::Format for Pin<'a, R, G, N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Pin({=u8}, {=u32})",
            self.port,
            self.mask.trailing_zeros()
        )
    }
}
