//! Spinlocks usable from both thread and interrupt context.
//!
//! There is no scheduler underneath these locks. [RawLock::acquire]
//! busy-waits with no timeout and no retry limit. A context that holds a
//! lock forever, or an interrupt handler that spins on a lock held by
//! the code it preempted, starves every other user of that lock
//! permanently. Keep critical sections short and never take a lock from
//! an interrupt that can preempt a holder of the same lock on a single
//! core.

use core::cell::UnsafeCell;
use core::sync::atomic::Ordering;

use portable_atomic::AtomicU16;

const LOCKED: u16 = 0x8811;
const UNLOCKED: u16 = 0x0000;

/// A lock word with exactly two states, locked and unlocked.
///
/// [RawLock::lock] is the bare exclusive-access primitive: it always
/// stores the locked value and reports what was there before. It does
/// not by itself provide mutual exclusion. Use [RawLock::acquire], or
/// better [SpinLock], for that.
pub struct RawLock {
    word: AtomicU16,
}

impl RawLock {
    /// Create an unlocked lock.
    pub const fn new() -> Self {
        Self {
            word: AtomicU16::new(UNLOCKED),
        }
    }

    /// Atomically mark the lock as held, returning `true` if it was
    /// already held.
    ///
    /// On ARMv7-M this is an `LDREXH`/`STREXH` pair, retried only when
    /// the exclusive store fails because another context touched the
    /// word in between. A `true` result means someone else owns the
    /// lock and the caller does not.
    #[inline]
    #[must_use]
    pub fn lock(&self) -> bool {
        self.word.swap(LOCKED, Ordering::Acquire) != UNLOCKED
    }

    /// Try once to take the lock. Returns `true` if the caller now owns it.
    #[inline]
    pub fn try_acquire(&self) -> bool {
        !self.lock()
    }

    /// Spin until the caller owns the lock.
    #[inline]
    pub fn acquire(&self) {
        while self.lock() {
            core::hint::spin_loop();
        }
    }

    /// Release the lock.
    ///
    /// # Safety
    /// There is no ownership check. The caller must currently own the
    /// lock, through [RawLock::acquire] or a successful
    /// [RawLock::try_acquire].
    #[inline]
    pub unsafe fn unlock(&self) {
        self.word.store(UNLOCKED, Ordering::Release);
    }

    /// Is someone holding this lock right now?
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.word.load(Ordering::Relaxed) != UNLOCKED
    }
}

impl Default for RawLock {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for RawLock {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_tuple("RawLock").field(&self.is_locked()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawLock {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "RawLock({})", self.is_locked());
    }
}

/// Protects a `T` with a [RawLock].
///
/// Access goes through [SpinLockGuard], which releases the lock when
/// dropped, so every exit path out of a critical section unlocks.
pub struct SpinLock<T> {
    raw: RawLock,
    data: UnsafeCell<T>,
}

// safety: the lock hands out at most one &mut T at a time
unsafe impl<T: Send> Sync for SpinLock<T> {}

impl<T> SpinLock<T> {
    /// Create an unlocked spinlock around `data`.
    pub const fn new(data: T) -> Self {
        Self {
            raw: RawLock::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Spin until the lock is held, then return a guard.
    #[inline]
    pub fn lock(&self) -> SpinLockGuard<'_, T> {
        self.raw.acquire();
        SpinLockGuard { lock: self }
    }

    /// Take the lock if nobody holds it.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinLockGuard<'_, T>> {
        if self.raw.try_acquire() {
            Some(SpinLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Is the lock held right now?
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Access the data without locking, through a unique reference.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Recover the protected data.
    #[inline]
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T> core::fmt::Debug for SpinLock<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("SpinLock")
            .field("locked", &self.is_locked())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "defmt")]
impl<T> defmt::Format for SpinLock<T> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SpinLock(locked: {})", self.is_locked());
    }
}

/// Scoped ownership of a [SpinLock].
#[must_use = "if dropped, the spinlock will immediately unlock"]
pub struct SpinLockGuard<'a, T> {
    lock: &'a SpinLock<T>,
}

impl<T> core::ops::Deref for SpinLockGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // safety: we hold the lock
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> core::ops::DerefMut for SpinLockGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // safety: we hold the lock, and have the only guard
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinLockGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // safety: a guard only exists while its lock is held
        unsafe { self.lock.raw.unlock() }
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for SpinLockGuard<'_, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&**self, f)
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn raw_lock_reports_previous_state() {
        let lock = RawLock::new();
        assert!(!lock.is_locked());

        assert!(!lock.lock());
        assert!(lock.is_locked());

        // claiming again still leaves it locked, but reports contention
        assert!(lock.lock());
        assert!(lock.is_locked());

        unsafe { lock.unlock() };
        assert!(!lock.is_locked());
        assert!(!lock.lock());
    }

    #[test]
    fn try_acquire_fails_while_held() {
        let lock = RawLock::new();
        assert!(lock.try_acquire());
        assert!(!lock.try_acquire());
        unsafe { lock.unlock() };
        assert!(lock.try_acquire());
    }

    #[test]
    fn guard_releases_on_drop() {
        let lock = SpinLock::new(5u32);
        {
            let mut guard = lock.lock();
            *guard += 1;
            assert!(lock.is_locked());
            assert!(lock.try_lock().is_none());
        }
        assert!(!lock.is_locked());
        assert_eq!(6, *lock.try_lock().unwrap());
    }

    #[test]
    fn guard_releases_on_early_return() {
        fn bump(lock: &SpinLock<u32>, stop: bool) -> Option<u32> {
            let mut guard = lock.lock();
            if stop {
                return None;
            }
            *guard += 1;
            Some(*guard)
        }

        let lock = SpinLock::new(0);
        assert_eq!(None, bump(&lock, true));
        assert!(!lock.is_locked());
        assert_eq!(Some(1), bump(&lock, false));
        assert_eq!(1, lock.into_inner());
    }

    #[test]
    fn get_mut_skips_locking() {
        let mut lock = SpinLock::new([0u8; 2]);
        lock.get_mut()[1] = 7;
        assert!(!lock.is_locked());
        assert_eq!([0, 7], lock.into_inner());
    }

    #[test]
    fn acquire_admits_one_context_at_a_time() {
        const ROUNDS: usize = 20_000;

        let lock = Arc::new(RawLock::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let most = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..2)
            .map(|_| {
                let lock = lock.clone();
                let inside = inside.clone();
                let most = most.clone();
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        lock.acquire();
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        most.fetch_max(now, Ordering::SeqCst);
                        inside.fetch_sub(1, Ordering::SeqCst);
                        unsafe { lock.unlock() };
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(1, most.load(Ordering::SeqCst));
        assert!(!lock.is_locked());
    }

    #[test]
    fn spinlock_protects_non_atomic_counter() {
        const ROUNDS: u32 = 2_000;

        let lock = Arc::new(SpinLock::new(0u32));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        let mut count = lock.lock();
                        // split read and write so lost updates would show
                        let seen = *count;
                        thread::yield_now();
                        *count = seen + 1;
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(4 * ROUNDS, *lock.lock());
    }
}
