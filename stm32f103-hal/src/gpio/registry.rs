use crate::fault::Fault;
use crate::pac;
use crate::power::ClockGate;
use crate::sync::{SpinLock, SpinLockGuard};

use super::PortRegisters;

/// Mutable state of one port, only touched under its lock.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortState {
    /// Has the port's clock been turned on by [Registry::initialize]?
    pub initialized: bool,
}

/// Everything the drivers know about one port.
///
/// Descriptors are built once, in a `static`, and never change. Only the
/// [PortState] behind the lock does.
pub struct Port<R> {
    regs: *const R,
    gate_bit: u8,
    state: SpinLock<PortState>,
}

// safety: the register block is only read-modify-written while `state`
// is locked, or through writes the hardware makes atomic, and
// PortRegisters implementations allow that sharing
unsafe impl<R: PortRegisters> Sync for Port<R> {}

impl<R> Port<R> {
    /// Describe a port whose registers live in ordinary memory.
    pub const fn new(regs: &'static R, gate_bit: u8) -> Self {
        Self {
            regs,
            gate_bit,
            state: SpinLock::new(PortState { initialized: false }),
        }
    }

    /// Describe a port from the address of its register block.
    ///
    /// # Safety
    /// `regs` must point at a valid register block for the life of the
    /// program, and nothing outside the drivers may modify it.
    pub const unsafe fn from_ptr(regs: *const R, gate_bit: u8) -> Self {
        Self {
            regs,
            gate_bit,
            state: SpinLock::new(PortState { initialized: false }),
        }
    }

    /// The port's registers.
    #[inline(always)]
    pub(crate) fn regs(&self) -> &R {
        // safety: guaranteed by the constructors
        unsafe { &*self.regs }
    }

    /// Lock the port for a read-modify-write of its registers.
    #[inline(always)]
    pub(crate) fn lock(&self) -> SpinLockGuard<'_, PortState> {
        self.state.lock()
    }

    /// The clock enable bit for this port.
    #[inline(always)]
    pub fn gate_bit(&self) -> u8 {
        self.gate_bit
    }

    /// Is someone operating on this port right now?
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }
}

impl<R> core::fmt::Debug for Port<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Port")
            .field("regs", &self.regs)
            .field("gate_bit", &self.gate_bit)
            .field("state", &self.state)
            .finish()
    }
}

/// A fixed table of ports, indexed by port id.
///
/// Generic over the register interface and the clock gate so the same
/// drivers run against the chip ([PORTS]) or simulated registers.
pub struct Registry<R, G, const N: usize> {
    gate: *const G,
    ports: [Port<R>; N],
}

// safety: ports are Sync as above, and ClockGate implementations
// synchronize their own writes
unsafe impl<R: PortRegisters, G: ClockGate, const N: usize> Sync
    for Registry<R, G, N>
{
}

impl<R, G, const N: usize> Registry<R, G, N> {
    /// Build a registry of ports sharing a clock gate in ordinary memory.
    pub const fn new(gate: &'static G, ports: [Port<R>; N]) -> Self {
        Self { gate, ports }
    }

    /// Build a registry from the address of the clock gate registers.
    ///
    /// # Safety
    /// `gate` must point at a valid register block for the life of the
    /// program.
    pub const unsafe fn from_ptr(gate: *const G, ports: [Port<R>; N]) -> Self {
        Self { gate, ports }
    }

    /// How many ports are in this registry.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        N
    }

    /// Is this registry empty?
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Find the descriptor for a port.
    ///
    /// An id past the end of the table is a caller error and is
    /// reported as [Fault::InvalidParameter].
    #[inline]
    #[track_caller]
    pub fn lookup(&self, port: impl Into<u8>) -> &Port<R> {
        let index = usize::from(port.into());
        hal_assert!(index < N, Fault::InvalidParameter);
        &self.ports[index]
    }

    #[inline(always)]
    pub(crate) fn gate(&self) -> &G {
        // safety: guaranteed by the constructors
        unsafe { &*self.gate }
    }
}

impl<R, G, const N: usize> Registry<R, G, N>
where
    R: PortRegisters,
    G: ClockGate,
{
    /// Turn on a port's clock, once.
    ///
    /// Later calls do nothing, so code that may reconfigure a port can
    /// call this freely.
    #[track_caller]
    pub fn initialize(&self, port: impl Into<u8>) {
        let port = self.lookup(port);
        let mut state = port.lock();
        if !state.initialized {
            #[cfg(feature = "defmt")]
            defmt::debug!("enabling clock bit {=u8}", port.gate_bit);

            self.gate().enable(port.gate_bit);
            state.initialized = true;
        }
    }

    /// Has [Registry::initialize] run for this port?
    #[track_caller]
    pub fn is_initialized(&self, port: impl Into<u8>) -> bool {
        self.lookup(port).lock().initialized
    }
}

impl<R, G, const N: usize> core::fmt::Debug for Registry<R, G, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_list().entries(self.ports.iter()).finish()
    }
}

/// Number of GPIO ports on this chip.
#[cfg(not(feature = "high-density"))]
pub const NUM_PORTS: usize = 5;
/// Number of GPIO ports on this chip.
#[cfg(feature = "high-density")]
pub const NUM_PORTS: usize = 7;

/// The registry type for this chip.
pub type Ports = Registry<pac::gpio::RegisterBlock, pac::rcc::RegisterBlock, NUM_PORTS>;

macro_rules! ports {
    ($(($periph:ident, $bit:ident)),+ $(,)?) => {
        // safety: these are the chip's register blocks, and the
        // drivers are their only users
        unsafe {
            Registry::from_ptr(
                pac::RCC::PTR,
                [$(Port::from_ptr(pac::$periph::PTR, pac::rcc::apb2enr::$bit)),+],
            )
        }
    };
}

/// The GPIO ports of this chip, indexed by [PortId](super::PortId).
#[cfg(not(feature = "high-density"))]
pub static PORTS: Ports = ports![
    (GPIOA, IOPAEN),
    (GPIOB, IOPBEN),
    (GPIOC, IOPCEN),
    (GPIOD, IOPDEN),
    (GPIOE, IOPEEN),
];

/// The GPIO ports of this chip, indexed by [PortId](super::PortId).
#[cfg(feature = "high-density")]
pub static PORTS: Ports = ports![
    (GPIOA, IOPAEN),
    (GPIOB, IOPBEN),
    (GPIOC, IOPCEN),
    (GPIOD, IOPDEN),
    (GPIOE, IOPEEN),
    (GPIOF, IOPFEN),
    (GPIOG, IOPGEN),
];
