//! Reporting of caller errors.
//!
//! Passing an out-of-range port or pin is a programming error, not a
//! runtime condition, so nothing here returns a `Result`. Instead the
//! driver reports the fault with the source location and halts through
//! the application's panic handler.
//!
//! Checks made with [hal_assert!] only run when `debug_assertions` are
//! enabled. Release builds skip them, and callers must pass valid
//! arguments regardless of build mode. Skipping a check never makes the
//! driver unsound: register tables are still indexed with bounds
//! checks, so an invalid port still traps, only with a less helpful
//! message.

/// A caller error, from a fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    NotSupported,
    NotImplemented,
    NoMemory,
    InvalidParameter,
}

impl Fault {
    /// The short message reported for this fault.
    #[inline]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotSupported => "Not Supported",
            Self::NotImplemented => "Not Implemented",
            Self::NoMemory => "No Memory",
            Self::InvalidParameter => "Invalid Parameter",
        }
    }
}

impl core::fmt::Display for Fault {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

/// Report a fault at the caller's location and halt.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fail(fault: Fault) -> ! {
    #[cfg(feature = "defmt")]
    {
        let location = core::panic::Location::caller();
        defmt::error!(
            "{=str}:{=u32}: {=str}",
            location.file(),
            location.line(),
            fault.message()
        );
    }

    panic!("{}", fault)
}

/// Report `$fault` unless `$cond` holds. Compiled out without
/// `debug_assertions`.
macro_rules! hal_assert {
    ($cond:expr, $fault:expr) => {
        if cfg!(debug_assertions) && !($cond) {
            $crate::fault::fail($fault)
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!("Invalid Parameter", Fault::InvalidParameter.message());
        assert_eq!("Not Implemented", Fault::NotImplemented.to_string());
        assert_eq!("No Memory", Fault::NoMemory.to_string());
        assert_eq!("Not Supported", Fault::NotSupported.to_string());
    }

    #[test]
    #[should_panic(expected = "Not Implemented")]
    fn fail_panics_with_message() {
        fail(Fault::NotImplemented);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Invalid Parameter")]
    fn assert_reports_false_condition() {
        let index = 9;
        hal_assert!(index < 4, Fault::InvalidParameter);
    }

    #[test]
    fn assert_passes_true_condition() {
        let index = 3;
        hal_assert!(index < 4, Fault::InvalidParameter);
    }
}
