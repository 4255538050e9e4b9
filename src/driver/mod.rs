//! Core driver components for the multi-channel DMA controller.
//!
//! - [`config`] - Channel configuration types and builders
//! - [`error`] - Error type and result alias
//! - [`channel`] - Channel handles, lifecycle state and status bits
//! - [`ring`] - Virtual-FIFO pointer arithmetic
//! - [`engine`] - Per-channel state machine
//! - [`interrupt`] - Interrupt causes, callback tables and dispatch
//! - [`param`] - Generic parameter ids
//! - [`controller`] - The [`DmaController`] facade
//!
//! # Example
//!
//! ```ignore
//! use ph_mt3620_dma::driver::{ChannelConfig, HalfSizeParams, TransferDirection};
//!
//! let config = ChannelConfig::half_size(
//!     HalfSizeParams::new(TransferDirection::MemoryToPeripheral, buf_addr, uart_tx, 64),
//! );
//! ```

// Submodules
pub mod channel;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod interrupt;
pub mod param;
pub mod ring;

// Re-exports for convenience
pub use channel::{ChannelId, ChannelState, ChannelStatus};
pub use config::{
    AddressMap, AlertCompare, BurstSize, ChannelConfig, ChannelType, ControlMode,
    ControllerConfig, FullSizeParams, HalfSizeParams, InterruptEnable, TransferConfig,
    TransferDirection, TransferSize, VfifoParams, WrapSide, WrapTarget,
};
pub use controller::DmaController;
pub use engine::{ChannelEngine, ChannelSettings, RegisterDump};
pub use error::{Error, Result};
pub use interrupt::{
    DispatchBatch, InterruptCause, InterruptDispatcher, InterruptHandler, IsrSlot, IsrTable,
    PendingEvent,
};
pub use param::ParamId;
pub use ring::RingPointerTracker;
