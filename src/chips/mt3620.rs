//! MT3620 DMA channel map
//!
//! The MT3620 general-purpose DMA block exposes 30 channel slots, one
//! register block each, `0x100` bytes apart:
//!
//! | Slots   | Type         | Users                         |
//! |---------|--------------|-------------------------------|
//! | 0-9     | Half-size    | ISU0-ISU4 TX/RX               |
//! | 12      | Full-size    | Memory to memory              |
//! | 13-22   | Virtual FIFO | ISU0-ISU4 TX/RX               |
//! | 25-28   | Virtual FIFO | I2S0/I2S1 TX/RX               |
//! | 29      | Virtual FIFO | ADC RX                        |
//!
//! Slots 10, 11, 23 and 24 have no channel.

use crate::driver::config::ChannelType;
use crate::driver::controller::DmaController;
use crate::hal::bus::MmioBus;

/// Base address of channel 0's register block
pub const DMA_BASE: usize = 0x2108_0000;

/// Distance between consecutive channel register blocks
pub const CHANNEL_STRIDE: usize = 0x100;

/// Number of channel slots
pub const CHANNEL_COUNT: usize = 30;

/// Channel slot indices
pub mod channel {
    /// ISU0 transmit, half-size
    pub const ISU0_TX: u8 = 0;
    /// ISU0 receive, half-size
    pub const ISU0_RX: u8 = 1;
    /// ISU1 transmit, half-size
    pub const ISU1_TX: u8 = 2;
    /// ISU1 receive, half-size
    pub const ISU1_RX: u8 = 3;
    /// ISU2 transmit, half-size
    pub const ISU2_TX: u8 = 4;
    /// ISU2 receive, half-size
    pub const ISU2_RX: u8 = 5;
    /// ISU3 transmit, half-size
    pub const ISU3_TX: u8 = 6;
    /// ISU3 receive, half-size
    pub const ISU3_RX: u8 = 7;
    /// ISU4 transmit, half-size
    pub const ISU4_TX: u8 = 8;
    /// ISU4 receive, half-size
    pub const ISU4_RX: u8 = 9;

    /// Memory to memory, full-size
    pub const M2M: u8 = 12;

    /// ISU0 transmit, virtual FIFO
    pub const VFF_ISU0_TX: u8 = 13;
    /// ISU0 receive, virtual FIFO
    pub const VFF_ISU0_RX: u8 = 14;
    /// ISU1 transmit, virtual FIFO
    pub const VFF_ISU1_TX: u8 = 15;
    /// ISU1 receive, virtual FIFO
    pub const VFF_ISU1_RX: u8 = 16;
    /// ISU2 transmit, virtual FIFO
    pub const VFF_ISU2_TX: u8 = 17;
    /// ISU2 receive, virtual FIFO
    pub const VFF_ISU2_RX: u8 = 18;
    /// ISU3 transmit, virtual FIFO
    pub const VFF_ISU3_TX: u8 = 19;
    /// ISU3 receive, virtual FIFO
    pub const VFF_ISU3_RX: u8 = 20;
    /// ISU4 transmit, virtual FIFO
    pub const VFF_ISU4_TX: u8 = 21;
    /// ISU4 receive, virtual FIFO
    pub const VFF_ISU4_RX: u8 = 22;

    /// I2S0 transmit, virtual FIFO
    pub const I2S0_TX: u8 = 25;
    /// I2S0 receive, virtual FIFO
    pub const I2S0_RX: u8 = 26;
    /// I2S1 transmit, virtual FIFO
    pub const I2S1_TX: u8 = 27;
    /// I2S1 receive, virtual FIFO
    pub const I2S1_RX: u8 = 28;
    /// ADC receive, virtual FIFO
    pub const ADC_RX: u8 = 29;
}

/// Hardware type of slot `index`, `None` for slots without a channel
#[must_use]
pub const fn channel_type(index: u8) -> Option<ChannelType> {
    match index {
        channel::ISU0_TX..=channel::ISU4_RX => Some(ChannelType::HalfSize),
        channel::M2M => Some(ChannelType::FullSize),
        channel::VFF_ISU0_TX..=channel::VFF_ISU4_RX => Some(ChannelType::VirtualFifo),
        channel::I2S0_TX..=channel::ADC_RX => Some(ChannelType::VirtualFifo),
        _ => None,
    }
}

/// Slot layout for [`DmaController::new`]
pub const LAYOUT: [Option<ChannelType>; CHANNEL_COUNT] = {
    let mut layout = [None; CHANNEL_COUNT];
    let mut i = 0;
    while i < CHANNEL_COUNT {
        layout[i] = channel_type(i as u8);
        i += 1;
    }
    layout
};

/// Controller sized for the MT3620
pub type Mt3620Dma<'h, B, C, L, D> = DmaController<'h, B, C, L, D, CHANNEL_COUNT>;

/// MMIO bus over the MT3620 DMA register window
///
/// # Safety
///
/// The caller must own the DMA block exclusively; no other code may touch
/// the channel registers while the returned bus is in use.
#[must_use]
pub const unsafe fn mmio_bus() -> MmioBus {
    // SAFETY: forwarded to the caller.
    unsafe { MmioBus::new(DMA_BASE, CHANNEL_STRIDE) }
}
