//! Generic channel parameters
//!
//! `get_param`/`set_param` expose individual hardware values by id. Which ids
//! are legal depends on the channel type:
//!
//! | Id                    | Full | Half | VFF | Access            |
//! |-----------------------|------|------|-----|-------------------|
//! | `RemainingLength`     | ✓    | ✓    |     | read              |
//! | `FixedAddress`        |      | ✓    | ✓   | read/write        |
//! | `ProgrammableAddress` |      | ✓    | ✓   | read/write        |
//! | `FifoSize`            |      |      | ✓   | read/write (idle) |
//! | `FifoCount`           |      |      | ✓   | read              |
//! | `HwPointer`           |      |      | ✓   | read              |
//! | `SwPointer`           |      |      | ✓   | read              |
//!
//! The software pointer is advanced only through `update_software_pointer`.

use super::config::ChannelType;
use super::error::{Error, Result};

/// Parameter id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ParamId {
    /// Bytes left in the current transfer
    RemainingLength = 0,
    /// Fixed-side (peripheral) address
    FixedAddress = 1,
    /// Programmable-side (memory) address
    ProgrammableAddress = 2,
    /// Virtual-FIFO capacity in bytes
    FifoSize = 3,
    /// Bytes currently held in the virtual FIFO
    FifoCount = 4,
    /// Virtual-FIFO hardware pointer
    HwPointer = 5,
    /// Virtual-FIFO software pointer
    SwPointer = 6,
}

impl ParamId {
    /// Decode a raw parameter id
    pub const fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(ParamId::RemainingLength),
            1 => Ok(ParamId::FixedAddress),
            2 => Ok(ParamId::ProgrammableAddress),
            3 => Ok(ParamId::FifoSize),
            4 => Ok(ParamId::FifoCount),
            5 => Ok(ParamId::HwPointer),
            6 => Ok(ParamId::SwPointer),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Whether the parameter exists on a channel of `channel_type`
    #[must_use]
    pub const fn applies_to(&self, channel_type: ChannelType) -> bool {
        match self {
            ParamId::RemainingLength => !matches!(channel_type, ChannelType::VirtualFifo),
            ParamId::FixedAddress | ParamId::ProgrammableAddress => {
                channel_type.has_peripheral_side()
            }
            ParamId::FifoSize | ParamId::FifoCount | ParamId::HwPointer | ParamId::SwPointer => {
                matches!(channel_type, ChannelType::VirtualFifo)
            }
        }
    }

    /// Whether the parameter can be written
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        matches!(
            self,
            ParamId::FixedAddress | ParamId::ProgrammableAddress | ParamId::FifoSize
        )
    }
}
