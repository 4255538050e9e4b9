//! Synchronization and Concurrency Support
//!
//! - **Primitives** (`primitives`): [`CriticalSectionCell`] for ISR-safe
//!   interior mutability and, with `async`, [`AtomicWaker`]
//! - **Shared Wrapper** (`shared`): [`SharedDma`], a critical-section
//!   protected controller whose interrupt dispatch runs callbacks outside
//!   the borrow
//! - **Async Support** (`asynch`, feature `async`): [`InterruptSignal`], an
//!   awaitable interrupt handler
//!
//! # Example
//!
//! ```ignore
//! use ph_mt3620_dma::sync::SharedDma;
//!
//! static DMA: SharedDma<'static, MmioBus, (), Nvic, Delay, 30> = SharedDma::new(/* ... */);
//!
//! fn main() {
//!     let ch = DMA.with(|dma| dma.allocate(channel::M2M)).unwrap();
//!     DMA.with(|dma| dma.start(ch)).unwrap();
//! }
//!
//! #[interrupt]
//! fn DMA_IRQ() {
//!     DMA.handle_interrupt();
//! }
//! ```

mod primitives;

#[cfg(feature = "async")]
pub use primitives::AtomicWaker;
pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedDma;

#[cfg(feature = "async")]
pub mod asynch;

#[cfg(feature = "async")]
pub use asynch::InterruptSignal;
