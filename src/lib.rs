//! MT3620 Multi-Channel DMA Driver
//!
//! A `no_std`, `no_alloc` Rust driver for a multi-channel DMA controller with
//! three channel types sharing one register layout and one interrupt line.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Driver Layer** ([`driver`]): Channel configuration, per-channel
//!    state machines, virtual-FIFO pointer tracking and interrupt dispatch
//! 2. **HAL Layer** ([`hal`]): Register bus, clock gate and interrupt line
//!    seams implemented by the platform
//! 3. **Chip Layer** ([`chips`]): Register window and channel map for a
//!    concrete SoC
//!
//! ## Channel Types
//!
//! - **Full-size**: memory to memory, both addresses increment
//! - **Half-size**: memory to/from a fixed peripheral address
//! - **Virtual FIFO**: a ring buffer in memory fed or drained by a
//!   peripheral, with threshold and timeout interrupts
//!
//! # Features
//!
//! - `mt3620` (default): MT3620 channel map in [`chips::mt3620`]
//! - `defmt`: Log through defmt and derive `defmt::Format`
//! - `log`: Log through the `log` facade
//! - `async`: Awaitable interrupt signal in [`sync::asynch`]
//!
//! # Example
//!
//! ```ignore
//! use ph_mt3620_dma::chips::mt3620::{self, channel};
//! use ph_mt3620_dma::{
//!     ChannelConfig, InterruptCause, InterruptEnable, TransferDirection, VfifoParams,
//! };
//!
//! static mut RX_FIFO: [u8; 256] = [0; 256];
//!
//! let bus = unsafe { mt3620::mmio_bus() };
//! let mut dma = mt3620::Mt3620Dma::new(bus, clocks, nvic_line, delay, mt3620::LAYOUT);
//!
//! let rx = dma.allocate(channel::VFF_ISU0_RX)?;
//! dma.configure(
//!     rx,
//!     ChannelConfig::virtual_fifo(
//!         VfifoParams::new(
//!             TransferDirection::PeripheralToMemory,
//!             fifo_addr,
//!             uart_rx_port,
//!             256,
//!             64,
//!         )
//!         .with_timeout(1000),
//!     )
//!     .with_interrupts(InterruptEnable::FIFO_THRESHOLD | InterruptEnable::FIFO_TIMEOUT),
//! )?;
//! dma.register_isr(rx, InterruptCause::FifoThreshold, &on_rx)?;
//! dma.start(rx)?;
//!
//! // From the DMA interrupt vector
//! dma.handle_interrupt();
//!
//! let mut buf = [0u8; 64];
//! let n = dma.read_fifo(rx, &mut buf, buf.len())?;
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels mirror the [lints] table in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements,
    clippy::let_underscore_future
)]

// Logging shim; must come first so the macros are visible everywhere
mod fmt;

// =============================================================================
// Modules
// =============================================================================

pub mod chips;
pub mod driver;
pub mod hal;

// Internal implementation details (pub(crate) only)
mod internal;

pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::channel::{ChannelId, ChannelState, ChannelStatus};
pub use driver::config::{
    AddressMap, AlertCompare, BurstSize, ChannelConfig, ChannelType, ControlMode,
    ControllerConfig, FullSizeParams, HalfSizeParams, InterruptEnable, TransferConfig,
    TransferDirection, TransferSize, VfifoParams, WrapSide, WrapTarget,
};
pub use driver::controller::DmaController;
pub use driver::engine::{ChannelEngine, ChannelSettings, RegisterDump};
pub use driver::error::{Error, Result};
pub use driver::interrupt::{InterruptCause, InterruptHandler};
pub use driver::param::ParamId;
pub use driver::ring::RingPointerTracker;
pub use hal::{ClockGate, DmaBus, InterruptLine, MmioBus};

pub use sync::{CriticalSectionCell, SharedDma};

#[cfg(feature = "async")]
#[cfg_attr(docsrs, doc(cfg(feature = "async")))]
pub use sync::InterruptSignal;

/// Low-level register layout for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Writing channel registers through [`DmaBus`] directly bypasses the channel
/// state machines. Use only if you accept responsibility for sequencing.
pub mod unsafe_registers {
    pub use crate::internal::register::channel::*;
}

/// Shared driver constants.
pub mod constants {
    pub use crate::internal::constants::{
        ADDRESS_ALIGN, ISR_SLOTS, MAX_BURST_BYTES, MAX_DISPATCH_PASSES, MAX_FIFO_SIZE,
        RESET_POLL_ATTEMPTS, RESET_POLL_INTERVAL_US,
    };
}
