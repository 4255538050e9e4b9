//! ISR-safe controller wrapper using critical sections.

use embedded_hal::delay::DelayNs;

use super::primitives::CriticalSectionCell;
use crate::driver::controller::DmaController;
use crate::driver::interrupt::run_passes;
use crate::hal::bus::DmaBus;
use crate::hal::clock::ClockGate;
use crate::hal::irq::InterruptLine;

/// ISR-safe DMA controller wrapper.
///
/// All access goes through `critical_section::with()`, disabling interrupts
/// for the duration of the closure. [`handle_interrupt`](Self::handle_interrupt)
/// runs callbacks outside the borrow, so a callback may call
/// [`with`](Self::with) itself, for example to drain a virtual FIFO.
///
/// # Example
///
/// ```ignore
/// static DMA: SharedDma<'static, MmioBus, (), Nvic, Delay, 30> =
///     SharedDma::new(DmaController::new(unsafe { mt3620::mmio_bus() }, (), Nvic, Delay, mt3620::LAYOUT));
///
/// #[interrupt]
/// fn DMA_IRQ() {
///     DMA.handle_interrupt();
/// }
///
/// fn on_rx(ch: ChannelId, _cause: InterruptCause) {
///     let mut buf = [0u8; 64];
///     DMA.with(|dma| dma.read_fifo(ch, &mut buf, 64)).ok();
/// }
/// ```
pub struct SharedDma<'h, B, C, L, D, const N: usize> {
    inner: CriticalSectionCell<DmaController<'h, B, C, L, D, N>>,
}

impl<'h, B, C, L, D, const N: usize> SharedDma<'h, B, C, L, D, N>
where
    B: DmaBus,
    C: ClockGate,
    L: InterruptLine,
    D: DelayNs,
{
    /// Wrap a controller (const, suitable for static initialization).
    pub const fn new(dma: DmaController<'h, B, C, L, D, N>) -> Self {
        Self {
            inner: CriticalSectionCell::new(dma),
        }
    }

    /// Execute a closure with exclusive access to the controller.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut DmaController<'h, B, C, L, D, N>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut DmaController<'h, B, C, L, D, N>) -> R,
    {
        self.inner.try_with(f)
    }

    /// Service the shared interrupt line.
    ///
    /// Each collection pass borrows the controller; callbacks fire after
    /// the borrow is released. Returns the number of callbacks invoked.
    pub fn handle_interrupt(&self) -> usize {
        let passes = self.inner.with(|dma| {
            dma.mask_line();
            dma.config().max_dispatch_passes
        });
        let fired = run_passes(passes, || self.inner.with(DmaController::collect_pending));
        self.inner.with(DmaController::unmask_line);
        fired
    }
}
