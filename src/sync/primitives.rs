//! Synchronization primitives for ISR-safe access.
//!
//! Low-level building blocks for [`SharedDma`](super::SharedDma) and the
//! async interrupt signal.

use core::cell::RefCell;
#[cfg(feature = "async")]
use core::task::Waker;
use critical_section::Mutex;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` so the same value can be
/// reached from thread code and from the DMA interrupt handler.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    ///
    /// # Panics
    ///
    /// If called from inside another `with` on the same cell.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }

    /// Execute a closure with shared access.
    #[inline]
    pub fn with_ref<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| {
            let value = self.inner.borrow_ref(cs);
            f(&value)
        })
    }
}

/// Interrupt-safe storage for one task waker.
///
/// Registered from `poll`, woken from interrupt context.
#[cfg(feature = "async")]
pub struct AtomicWaker {
    waker: CriticalSectionCell<Option<Waker>>,
}

#[cfg(feature = "async")]
impl AtomicWaker {
    /// Create an empty waker slot (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            waker: CriticalSectionCell::new(None),
        }
    }

    /// Store `waker`, replacing a different one.
    pub fn register(&self, waker: &Waker) {
        self.waker.with(|slot| match slot {
            Some(existing) if existing.will_wake(waker) => {}
            _ => *slot = Some(waker.clone()),
        });
    }

    /// Wake and forget the stored waker, if any.
    ///
    /// The waker runs after the critical section ends.
    #[inline]
    pub fn wake(&self) {
        if let Some(waker) = self.waker.with(Option::take) {
            waker.wake();
        }
    }

    /// Whether a waker is stored.
    pub fn is_registered(&self) -> bool {
        self.waker.with_ref(Option::is_some)
    }
}

#[cfg(feature = "async")]
impl Default for AtomicWaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use super::*;
    use crate::driver::config::TransferDirection;
    use crate::driver::ring::RingPointerTracker;

    #[test]
    fn cell_guards_ring_state() {
        let cell = CriticalSectionCell::new(
            RingPointerTracker::new(16, TransferDirection::PeripheralToMemory).unwrap(),
        );
        cell.with(|ring| ring.sync_hw_pointer(10)).unwrap();
        assert_eq!(cell.with_ref(RingPointerTracker::occupied), 10);

        let sw = cell.with(|ring| ring.update_software_pointer(4)).unwrap();
        assert_eq!(sw, 4);
        assert_eq!(cell.with_ref(RingPointerTracker::available_to_read), 6);
    }

    #[test]
    fn try_with_fails_while_borrowed() {
        let cell = CriticalSectionCell::new(0u32);
        let nested = cell.with(|_| cell.try_with(|v| *v));
        assert_eq!(nested, None);
        assert_eq!(cell.try_with(|v| *v + 1), Some(1));
    }

    #[test]
    fn static_cell() {
        static CELL: CriticalSectionCell<u32> = CriticalSectionCell::new(0);
        CELL.with(|v| *v = 100);
        assert_eq!(CELL.with(|v| *v), 100);
    }

    #[cfg(feature = "async")]
    mod waker {
        extern crate std;

        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::task::Wake;

        use super::super::AtomicWaker;
        use core::task::Waker;

        struct WakeCounter(AtomicUsize);

        impl Wake for WakeCounter {
            fn wake(self: Arc<Self>) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn counting_waker() -> (Arc<WakeCounter>, Waker) {
            let counter = Arc::new(WakeCounter(AtomicUsize::new(0)));
            (counter.clone(), Waker::from(counter))
        }

        #[test]
        fn wake_runs_once_and_clears() {
            let slot = AtomicWaker::new();
            let (counter, waker) = counting_waker();
            assert!(!slot.is_registered());

            slot.register(&waker);
            assert!(slot.is_registered());
            slot.wake();
            slot.wake();
            assert_eq!(counter.0.load(Ordering::SeqCst), 1);
            assert!(!slot.is_registered());
        }

        #[test]
        fn register_replaces_previous() {
            let slot = AtomicWaker::default();
            let (first, w1) = counting_waker();
            let (second, w2) = counting_waker();
            slot.register(&w1);
            slot.register(&w2);
            slot.wake();
            assert_eq!(first.0.load(Ordering::SeqCst), 0);
            assert_eq!(second.0.load(Ordering::SeqCst), 1);
        }
    }
}
