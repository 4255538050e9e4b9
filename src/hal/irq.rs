//! Shared Interrupt Line HAL
//!
//! All channels share one interrupt vector. The platform's interrupt
//! controller handles vector installation and masking; the driver installs
//! the line on first allocation and masks it while scanning channel status.

/// Install/enable/disable triad for the shared DMA interrupt
pub trait InterruptLine {
    /// Install the DMA vector and configure its priority
    fn install(&mut self);

    /// Unmask the line
    fn enable(&mut self);

    /// Mask the line
    fn disable(&mut self);
}

/// Interrupt routing handled entirely outside the driver
impl InterruptLine for () {
    #[inline(always)]
    fn install(&mut self) {}

    #[inline(always)]
    fn enable(&mut self) {}

    #[inline(always)]
    fn disable(&mut self) {}
}

impl<T: InterruptLine + ?Sized> InterruptLine for &mut T {
    #[inline]
    fn install(&mut self) {
        (**self).install();
    }

    #[inline]
    fn enable(&mut self) {
        (**self).enable();
    }

    #[inline]
    fn disable(&mut self) {
        (**self).disable();
    }
}
