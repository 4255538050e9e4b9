//! Channel Clock Gating HAL
//!
//! Each channel's clock is gated on when the channel is allocated and off
//! again on release. The gate itself belongs to the platform (clock/power
//! controller); the driver only calls through [`ClockGate`].

/// Per-channel clock enable/disable pair
pub trait ClockGate {
    /// Ungate the clock for channel `index`
    fn enable(&mut self, index: u8);

    /// Gate the clock for channel `index`
    fn disable(&mut self, index: u8);
}

/// Clocks that are always running
impl ClockGate for () {
    #[inline(always)]
    fn enable(&mut self, _index: u8) {}

    #[inline(always)]
    fn disable(&mut self, _index: u8) {}
}

impl<T: ClockGate + ?Sized> ClockGate for &mut T {
    #[inline]
    fn enable(&mut self, index: u8) {
        (**self).enable(index);
    }

    #[inline]
    fn disable(&mut self, index: u8) {
        (**self).disable(index);
    }
}
