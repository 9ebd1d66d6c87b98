//! Register blocks for the STM32F103 peripherals used by the HAL.
//!
//! Only the GPIO ports and the reset and clock control block are
//! described. Registers are plain [VolatileCell]s; field-level meaning
//! is left to the HAL.
#![cfg_attr(not(test), no_std)]

use vcell::VolatileCell;

pub mod gpio {
    //! General purpose I/O port.

    use super::VolatileCell;

    /// Register block for one GPIO port.
    #[repr(C)]
    pub struct RegisterBlock {
        /// 0x00 - Configuration register low, pins 0 to 7.
        pub crl: VolatileCell<u32>,
        /// 0x04 - Configuration register high, pins 8 to 15.
        pub crh: VolatileCell<u32>,
        /// 0x08 - Input data register.
        pub idr: VolatileCell<u32>,
        /// 0x0c - Output data register.
        pub odr: VolatileCell<u32>,
        /// 0x10 - Bit set/reset register. Write only.
        pub bsrr: VolatileCell<u32>,
        /// 0x14 - Bit reset register. Write only.
        pub brr: VolatileCell<u32>,
        /// 0x18 - Configuration lock register.
        pub lckr: VolatileCell<u32>,
    }

    /// Reset value of CRL and CRH: every pin a floating input.
    pub const CR_RESET: u32 = 0x4444_4444;
}

pub mod rcc {
    //! Reset and clock control.

    use super::VolatileCell;

    /// Register block for the RCC.
    #[repr(C)]
    pub struct RegisterBlock {
        /// 0x00 - Clock control register.
        pub cr: VolatileCell<u32>,
        /// 0x04 - Clock configuration register.
        pub cfgr: VolatileCell<u32>,
        /// 0x08 - Clock interrupt register.
        pub cir: VolatileCell<u32>,
        /// 0x0c - APB2 peripheral reset register.
        pub apb2rstr: VolatileCell<u32>,
        /// 0x10 - APB1 peripheral reset register.
        pub apb1rstr: VolatileCell<u32>,
        /// 0x14 - AHB peripheral clock enable register.
        pub ahbenr: VolatileCell<u32>,
        /// 0x18 - APB2 peripheral clock enable register.
        pub apb2enr: VolatileCell<u32>,
        /// 0x1c - APB1 peripheral clock enable register.
        pub apb1enr: VolatileCell<u32>,
        /// 0x20 - Backup domain control register.
        pub bdcr: VolatileCell<u32>,
        /// 0x24 - Control/status register.
        pub csr: VolatileCell<u32>,
    }

    /// APB2ENR bit positions.
    pub mod apb2enr {
        pub const AFIOEN: u8 = 0;
        pub const IOPAEN: u8 = 2;
        pub const IOPBEN: u8 = 3;
        pub const IOPCEN: u8 = 4;
        pub const IOPDEN: u8 = 5;
        pub const IOPEEN: u8 = 6;
        pub const IOPFEN: u8 = 7;
        pub const IOPGEN: u8 = 8;
    }
}

// svd2rust-style peripheral tokens, one per register block instance
macro_rules! peripheral {
    ($(#[$attr:meta])* $name:ident, $module:ident, $addr:expr) => {
        $(#[$attr])*
        pub struct $name {
            _marker: core::marker::PhantomData<*const ()>,
        }

        // safety: the token only hands out shared references to MMIO
        unsafe impl Send for $name {}

        impl $name {
            /// Pointer to the register block.
            pub const PTR: *const $module::RegisterBlock = $addr as *const _;

            /// Return the pointer to the register block.
            #[inline(always)]
            pub const fn ptr() -> *const $module::RegisterBlock {
                Self::PTR
            }

            /// Unchecked access to the peripheral.
            ///
            /// # Safety
            /// Ensure that the new instance doesn't lead to unsound
            /// concurrent access to the registers.
            #[inline(always)]
            pub unsafe fn steal() -> Self {
                Self {
                    _marker: core::marker::PhantomData,
                }
            }
        }

        impl core::ops::Deref for $name {
            type Target = $module::RegisterBlock;

            #[inline(always)]
            fn deref(&self) -> &Self::Target {
                // safety: PTR is a valid, aligned register block on this chip
                unsafe { &*Self::PTR }
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
                f.write_str(stringify!($name))
            }
        }

        #[cfg(feature = "defmt")]
        impl defmt::Format for $name {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{}", stringify!($name));
            }
        }
    };
}

peripheral!(
    /// GPIO port A.
    GPIOA, gpio, 0x4001_0800
);
peripheral!(
    /// GPIO port B.
    GPIOB, gpio, 0x4001_0c00
);
peripheral!(
    /// GPIO port C.
    GPIOC, gpio, 0x4001_1000
);
peripheral!(
    /// GPIO port D.
    GPIOD, gpio, 0x4001_1400
);
peripheral!(
    /// GPIO port E.
    GPIOE, gpio, 0x4001_1800
);
peripheral!(
    /// GPIO port F. High-density parts only.
    GPIOF, gpio, 0x4001_1c00
);
peripheral!(
    /// GPIO port G. High-density parts only.
    GPIOG, gpio, 0x4001_2000
);
peripheral!(
    /// Reset and clock control.
    RCC, rcc, 0x4002_1000
);
