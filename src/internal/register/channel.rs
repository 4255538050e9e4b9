//! Channel Register Block Definitions
//!
//! Every channel owns an identical register block at `base + index * stride`.
//! Virtual-FIFO registers (0x40 and up) only respond on virtual-FIFO channels.

use crate::driver::config::{
    AddressMap, AlertCompare, ChannelConfig, TransferConfig, TransferDirection, WrapSide,
};

// =============================================================================
// Register Offsets
// =============================================================================

/// First address register (source, or programmable side)
pub const ADDR1_OFFSET: usize = 0x00;
/// Second address register (destination, or fixed side)
pub const ADDR2_OFFSET: usize = 0x04;
/// Wrap point register
pub const WPPT_OFFSET: usize = 0x08;
/// Wrap-to address register
pub const WPTO_OFFSET: usize = 0x0C;
/// Transfer count / FIFO threshold register
pub const COUNT_OFFSET: usize = 0x10;
/// Control register
pub const CON_OFFSET: usize = 0x14;
/// Start register
pub const START_OFFSET: usize = 0x18;
/// Interrupt status register (read-only)
pub const INTSTA_OFFSET: usize = 0x1C;
/// Interrupt acknowledge register (write-1-to-clear)
pub const ACK_OFFSET: usize = 0x20;
/// Remaining length register (read-only)
pub const RLCT_OFFSET: usize = 0x24;
/// Bandwidth limiter register
pub const LIMITER_OFFSET: usize = 0x28;
/// Pause register
pub const PAUSE_OFFSET: usize = 0x2C;
/// Stop register
pub const STOP_OFFSET: usize = 0x30;
/// Reset register
pub const RESET_OFFSET: usize = 0x34;
/// Channel status register (read-only)
pub const STATUS_OFFSET: usize = 0x38;
/// Virtual-FIFO size register; writing it rewinds both pointers
pub const FFSIZE_OFFSET: usize = 0x40;
/// Virtual-FIFO alert length register
pub const ALTLEN_OFFSET: usize = 0x44;
/// Virtual-FIFO timeout register (bus cycles)
pub const TIMEOUT_OFFSET: usize = 0x48;
/// Virtual-FIFO software pointer register
pub const SWPTR_OFFSET: usize = 0x4C;
/// Virtual-FIFO hardware pointer register (read-only)
pub const HWPTR_OFFSET: usize = 0x50;
/// Virtual-FIFO occupied count register (read-only)
pub const FFCNT_OFFSET: usize = 0x54;

// =============================================================================
// Control Register (CON) Bits
// =============================================================================

/// Transfer unit size shift
pub const CON_SIZE_SHIFT: u32 = 0;
/// Transfer unit size mask
pub const CON_SIZE_MASK: u32 = 0x3;
/// Source address increment
pub const CON_SINC: u32 = 1 << 2;
/// Destination address increment
pub const CON_DINC: u32 = 1 << 3;
/// Peripheral handshake (dreq) enable
pub const CON_DREQ: u32 = 1 << 4;
/// Word/byte conversion
pub const CON_B2W: u32 = 1 << 5;
/// Reload on completion
pub const CON_RELOAD: u32 = 1 << 6;
/// Bandwidth limiter enable
pub const CON_LIMITER_EN: u32 = 1 << 7;
/// Burst type shift
pub const CON_BURST_SHIFT: u32 = 8;
/// Burst type mask
pub const CON_BURST_MASK: u32 = 0x7 << 8;
/// Address wrap enable
pub const CON_WRAP_EN: u32 = 1 << 11;
/// Wrap side: 0 = source, 1 = destination
pub const CON_WRAP_SEL: u32 = 1 << 12;
/// Direction: 0 = memory to peripheral, 1 = peripheral to memory
pub const CON_DIR: u32 = 1 << 13;
/// Primary interrupt enable (completion or FIFO threshold)
pub const CON_ITEN: u32 = 1 << 14;
/// Secondary interrupt enable (half completion or FIFO timeout)
pub const CON_SECOND_ITEN: u32 = 1 << 15;
/// Alert compare mode: 0 = less than or equal, 1 = greater than
pub const CON_ALT_CMP: u32 = 1 << 16;

// =============================================================================
// Command / Status Bits
// =============================================================================

/// START: arm the channel
pub const START_STR: u32 = 1 << 0;
/// PAUSE: hold the channel after the current burst
pub const PAUSE_PAUSE: u32 = 1 << 0;
/// STOP: halt immediately
pub const STOP_STOP: u32 = 1 << 0;
/// RESET: warm reset, waits for the bus to go idle
pub const RESET_WARM: u32 = 1 << 0;
/// RESET: hard reset, restores register defaults
pub const RESET_HARD: u32 = 1 << 1;

/// INTSTA / ACK: primary interrupt latch
pub const INT_PRIMARY: u32 = 1 << 0;
/// INTSTA / ACK: secondary interrupt latch
pub const INT_SECONDARY: u32 = 1 << 1;
/// All interrupt latch bits
pub const INT_ALL: u32 = INT_PRIMARY | INT_SECONDARY;
/// ACK: clear the peripheral handshake request
pub const ACK_CLR_DREQ: u32 = 1 << 2;

/// STATUS: channel is transferring
pub const STATUS_RUNNING: u32 = 1 << 0;
/// STATUS: channel is paused
pub const STATUS_PAUSED: u32 = 1 << 1;

// =============================================================================
// Encoding
// =============================================================================

/// Encode the control register for a validated configuration
#[must_use]
pub fn encode_control(config: &ChannelConfig, map: &AddressMap) -> u32 {
    let control = &config.control;
    let mut con = (control.size as u32 & CON_SIZE_MASK) << CON_SIZE_SHIFT;
    con |= (control.burst.code() << CON_BURST_SHIFT) & CON_BURST_MASK;

    if map.src_inc {
        con |= CON_SINC;
    }
    if map.dst_inc {
        con |= CON_DINC;
    }
    if control.wrap_enable {
        con |= CON_WRAP_EN;
        if control.wrap_side == WrapSide::Destination {
            con |= CON_WRAP_SEL;
        }
    }
    if control.word_byte_conversion {
        con |= CON_B2W;
    }
    if control.throttle {
        con |= CON_LIMITER_EN;
    }
    if config.transfer.reload() {
        con |= CON_RELOAD;
    }
    if config.transfer.channel_type().has_peripheral_side() {
        con |= CON_DREQ;
    }
    if map.direction == Some(TransferDirection::PeripheralToMemory) {
        con |= CON_DIR;
    }
    if let TransferConfig::VirtualFifo(p) = &config.transfer {
        if p.alert_compare == AlertCompare::GreaterThan {
            con |= CON_ALT_CMP;
        }
    }

    let slots = crate::driver::interrupt::enable_slots(config.interrupts);
    if slots & INT_PRIMARY != 0 {
        con |= CON_ITEN;
    }
    if slots & INT_SECONDARY != 0 {
        con |= CON_SECOND_ITEN;
    }
    con
}

/// Registers included in a diagnostic dump, in address order
pub const DUMP_REGISTERS: [(&str, usize); 21] = [
    ("ADDR1", ADDR1_OFFSET),
    ("ADDR2", ADDR2_OFFSET),
    ("WPPT", WPPT_OFFSET),
    ("WPTO", WPTO_OFFSET),
    ("COUNT", COUNT_OFFSET),
    ("CON", CON_OFFSET),
    ("START", START_OFFSET),
    ("INTSTA", INTSTA_OFFSET),
    ("ACK", ACK_OFFSET),
    ("RLCT", RLCT_OFFSET),
    ("LIMITER", LIMITER_OFFSET),
    ("PAUSE", PAUSE_OFFSET),
    ("STOP", STOP_OFFSET),
    ("RESET", RESET_OFFSET),
    ("STATUS", STATUS_OFFSET),
    ("FFSIZE", FFSIZE_OFFSET),
    ("ALTLEN", ALTLEN_OFFSET),
    ("TIMEOUT", TIMEOUT_OFFSET),
    ("SWPTR", SWPTR_OFFSET),
    ("HWPTR", HWPTR_OFFSET),
    ("FFCNT", FFCNT_OFFSET),
];

/// Number of registers dumped for channels without a virtual FIFO
pub const DUMP_COMMON_REGISTERS: usize = 15;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{
        BurstSize, ControlMode, FullSizeParams, HalfSizeParams, InterruptEnable, TransferSize,
        VfifoParams,
    };

    fn encode(config: &ChannelConfig) -> u32 {
        encode_control(config, &AddressMap::resolve(&config.transfer))
    }

    #[test]
    fn full_size_control_word() {
        let config = ChannelConfig::full_size(FullSizeParams::new(0x1000, 0x2000, 256))
            .with_control(
                ControlMode::new()
                    .with_burst(BurstSize::Beat4)
                    .with_size(TransferSize::Long),
            )
            .with_interrupts(InterruptEnable::COMPLETION);
        let con = encode(&config);

        assert_eq!(con & CON_SIZE_MASK, TransferSize::Long as u32);
        assert_eq!((con & CON_BURST_MASK) >> CON_BURST_SHIFT, 2);
        assert_ne!(con & CON_SINC, 0);
        assert_ne!(con & CON_DINC, 0);
        assert_eq!(con & CON_DREQ, 0);
        assert_ne!(con & CON_ITEN, 0);
        assert_eq!(con & CON_SECOND_ITEN, 0);
    }

    #[test]
    fn half_size_rx_control_word() {
        let config = ChannelConfig::half_size(
            HalfSizeParams::new(TransferDirection::PeripheralToMemory, 0x2000_0000, 0x3800_0000, 16)
                .with_reload(true),
        )
        .with_interrupts(InterruptEnable::HALF_COMPLETION);
        let con = encode(&config);

        assert_eq!(con & CON_SINC, 0);
        assert_ne!(con & CON_DINC, 0);
        assert_ne!(con & CON_DIR, 0);
        assert_ne!(con & CON_DREQ, 0);
        assert_ne!(con & CON_RELOAD, 0);
        assert_eq!(con & CON_ITEN, 0);
        assert_ne!(con & CON_SECOND_ITEN, 0);
    }

    #[test]
    fn vfifo_alert_compare_and_slots() {
        let config = ChannelConfig::virtual_fifo(
            VfifoParams::new(TransferDirection::MemoryToPeripheral, 0x2000_0000, 0x3800_0000, 64, 8)
                .with_alert(AlertCompare::GreaterThan, 4),
        )
        .with_interrupts(InterruptEnable::FIFO_THRESHOLD | InterruptEnable::FIFO_TIMEOUT);
        let con = encode(&config);

        assert_ne!(con & CON_ALT_CMP, 0);
        assert_ne!(con & CON_ITEN, 0);
        assert_ne!(con & CON_SECOND_ITEN, 0);
        assert_ne!(con & CON_SINC, 0);
        assert_eq!(con & CON_DIR, 0);
    }

    #[test]
    fn dump_table_is_sorted_and_common_prefix() {
        for pair in DUMP_REGISTERS.windows(2) {
            assert!(pair[0].1 < pair[1].1);
        }
        assert_eq!(DUMP_REGISTERS[DUMP_COMMON_REGISTERS - 1].1, STATUS_OFFSET);
        assert_eq!(DUMP_REGISTERS[DUMP_COMMON_REGISTERS].1, FFSIZE_OFFSET);
    }
}
