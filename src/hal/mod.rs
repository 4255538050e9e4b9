//! Hardware Abstraction Layer
//!
//! Traits for the collaborators the driver consumes but does not own.
//!
//! # Modules
//!
//! - [`bus`]: Register and DMA memory access by channel index
//! - [`clock`]: Per-channel clock gating
//! - [`irq`]: The shared DMA interrupt line
//!
//! # Delay Integration
//!
//! Reset polling uses `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod bus;
pub mod clock;
pub mod irq;

// Re-export commonly used types
pub use bus::{DmaBus, MmioBus};
pub use clock::ClockGate;
pub use irq::InterruptLine;
