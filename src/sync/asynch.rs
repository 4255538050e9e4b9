//! Async/await support for DMA interrupts.
//!
//! [`InterruptSignal`] is an [`InterruptHandler`] that a task can await.
//! Register it for the causes the task cares about; the interrupt handler
//! stores the cause and wakes the task.
//!
//! # Example
//!
//! ```ignore
//! static RX_READY: InterruptSignal = InterruptSignal::new();
//!
//! DMA.with(|dma| dma.register_isr(ch, InterruptCause::FifoThreshold, &RX_READY))?;
//!
//! loop {
//!     RX_READY.wait().await;
//!     let n = DMA.with(|dma| dma.read_fifo(ch, &mut buf, buf.len()))?;
//! }
//! ```

use core::future::poll_fn;
use core::task::Poll;

use super::primitives::{AtomicWaker, CriticalSectionCell};
use crate::driver::channel::ChannelId;
use crate::driver::interrupt::{InterruptCause, InterruptHandler};

/// Awaitable DMA interrupt notification
///
/// Holds at most one undelivered cause; a newer cause replaces an older one
/// that nobody awaited yet.
pub struct InterruptSignal {
    pending: CriticalSectionCell<Option<InterruptCause>>,
    waker: AtomicWaker,
}

impl InterruptSignal {
    /// Create an empty signal (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            pending: CriticalSectionCell::new(None),
            waker: AtomicWaker::new(),
        }
    }

    /// Store `cause` and wake the waiting task
    pub fn signal(&self, cause: InterruptCause) {
        self.pending.with(|pending| *pending = Some(cause));
        self.waker.wake();
    }

    /// Take the undelivered cause, if any
    pub fn take(&self) -> Option<InterruptCause> {
        self.pending.with(Option::take)
    }

    /// Whether a cause is waiting to be delivered
    pub fn is_pending(&self) -> bool {
        self.pending.with_ref(Option::is_some)
    }

    /// Wait for the next cause
    pub async fn wait(&self) -> InterruptCause {
        poll_fn(|cx| {
            if let Some(cause) = self.take() {
                return Poll::Ready(cause);
            }
            self.waker.register(cx.waker());
            // a signal may land between the check and the registration
            match self.take() {
                Some(cause) => Poll::Ready(cause),
                None => Poll::Pending,
            }
        })
        .await
    }
}

impl Default for InterruptSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptHandler for InterruptSignal {
    fn on_interrupt(&self, channel: ChannelId, cause: InterruptCause) {
        trace!("dma ch{} signal {:?}", channel.index(), cause);
        self.signal(cause);
    }
}
