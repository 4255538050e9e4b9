//! Centralized Constants
//!
//! Tunable defaults and limits shared by the driver. Register offsets and bit
//! fields live in [`super::register::channel`].

// =============================================================================
// Bus Limits
// =============================================================================

/// Largest burst the bus accepts, in bytes (beats × unit width)
pub const MAX_BURST_BYTES: u32 = 16;

/// Required alignment of fixed/programmable addresses set through parameters
pub const ADDRESS_ALIGN: u32 = 4;

/// Largest virtual-FIFO capacity the 16-bit FFSIZE field can hold
pub const MAX_FIFO_SIZE: u32 = 0xFFFF;

// =============================================================================
// Timing Constants
// =============================================================================

/// Default number of status polls while waiting for a warm reset
pub const RESET_POLL_ATTEMPTS: u32 = 100;

/// Default delay between reset status polls in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 10;

// =============================================================================
// Interrupt Dispatch
// =============================================================================

/// Default bound on collect/fire passes per interrupt entry
///
/// Events still pending after the last pass keep the line asserted and are
/// serviced on the next entry.
pub const MAX_DISPATCH_PASSES: u32 = 4;

/// Interrupt callback slots per channel
pub const ISR_SLOTS: usize = 2;
