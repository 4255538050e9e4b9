//! Channel identity, lifecycle state and status bits

use bitflags::bitflags;

/// Validated channel slot handle
///
/// Obtained from [`DmaController::allocate`](crate::DmaController::allocate).
/// Holding a `ChannelId` does not keep the slot alive; operations on a
/// released slot fail with [`Error::NullPointer`](crate::Error::NullPointer).
/// Each allocation of a slot carries a new generation, so a handle from an
/// earlier allocation stays invalid after the slot is claimed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId {
    index: u8,
    generation: u16,
}

impl ChannelId {
    pub(crate) const fn new(index: u8) -> Self {
        Self::with_generation(index, 0)
    }

    pub(crate) const fn with_generation(index: u8, generation: u16) -> Self {
        Self { index, generation }
    }

    /// Hardware channel index
    #[inline(always)]
    #[must_use]
    pub const fn index(&self) -> u8 {
        self.index
    }

    /// Allocation generation of the slot this handle was issued for
    #[inline(always)]
    #[must_use]
    pub const fn generation(&self) -> u16 {
        self.generation
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ch{}", self.index)
    }
}

/// Channel lifecycle state
///
/// ```text
/// Idle --start--> Running --pause--> Paused
///  ^                 ^ <----resume----  |
///  +------stop/reset-+------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// Not transferring; the only state that accepts configuration
    #[default]
    Idle,
    /// Armed and transferring
    Running,
    /// Holding after the current burst, progress retained
    Paused,
}

bitflags! {
    /// Channel status as reported by hardware
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChannelStatus: u32 {
        /// At least one interrupt latch is set
        const INTERRUPT_PENDING = 1 << 0;
        /// Channel is transferring
        const RUNNING = 1 << 1;
        /// Channel is paused
        const PAUSED = 1 << 2;
    }
}

impl Default for ChannelStatus {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChannelStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ChannelStatus({=u32:#x})", self.bits());
    }
}
