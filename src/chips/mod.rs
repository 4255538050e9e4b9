//! Chip-specific channel maps.
//!
//! Each chip module fixes the register base, the per-channel stride and the
//! hardware type of every channel slot, and provides a controller alias sized
//! for the chip.
//!
//! # Supported Chips
//!
//! - MT3620 (30 slots: half-size, full-size and virtual-FIFO channels)

#[cfg(feature = "mt3620")]
#[cfg_attr(docsrs, doc(cfg(feature = "mt3620")))]
pub mod mt3620;
