//! Testing utilities and mock implementations
//!
//! Host-side stand-ins for the channel register file, clock gates, the
//! interrupt line and delays. `MockBus` models enough of the controller to
//! drive the engine end to end: command side effects, interrupt latches and
//! a byte-addressable memory window for virtual FIFOs.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::vec;
use std::vec::Vec;

use crate::driver::channel::ChannelId;
use crate::driver::interrupt::{InterruptCause, InterruptHandler};
use crate::hal::bus::DmaBus;
use crate::hal::clock::ClockGate;
use crate::hal::irq::InterruptLine;
use crate::internal::register::channel::*;

/// Start of the mock memory window
pub const MOCK_MEM_BASE: u32 = 0x2000_0000;
/// Size of the mock memory window in bytes
pub const MOCK_MEM_SIZE: usize = 0x1000;

// =============================================================================
// Mock Bus
// =============================================================================

/// Mock channel register file
///
/// Unwritten registers read as zero. Writes to read-only registers are
/// logged but have no effect; use [`set_register`](Self::set_register) to
/// plant hardware-owned values.
#[derive(Debug)]
pub struct MockBus {
    /// Register values: (channel, offset) -> value
    registers: HashMap<(u8, usize), u32>,
    /// Record of writes: (channel, offset, value)
    write_log: Vec<(u8, usize, u32)>,
    /// Memory behind `MOCK_MEM_BASE`
    memory: Vec<u8>,
    /// Bus cycles since the last FIFO movement, per channel
    idle: HashMap<u8, u32>,
    /// Handshake clears, per channel
    dreq_clears: HashMap<u8, u32>,
    /// Channels that ignore warm reset
    stuck: Vec<u8>,
}

impl Default for MockBus {
    fn default() -> Self {
        Self {
            registers: HashMap::new(),
            write_log: Vec::new(),
            memory: vec![0; MOCK_MEM_SIZE],
            idle: HashMap::new(),
            dreq_clears: HashMap::new(),
            stuck: Vec::new(),
        }
    }
}

impl MockBus {
    /// Create a new mock bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value directly, bypassing side effects
    pub fn set_register(&mut self, index: u8, offset: usize, value: u32) {
        self.registers.insert((index, offset), value);
    }

    /// Get the current value of a register
    pub fn get_register(&self, index: u8, offset: usize) -> u32 {
        self.registers.get(&(index, offset)).copied().unwrap_or(0)
    }

    /// Get all writes that have been made
    pub fn writes(&self) -> &[(u8, usize, u32)] {
        &self.write_log
    }

    /// Values written to one register, in order
    pub fn writes_to(&self, index: u8, offset: usize) -> Vec<u32> {
        self.write_log
            .iter()
            .filter(|w| w.0 == index && w.1 == offset)
            .map(|w| w.2)
            .collect()
    }

    /// Clear the write log
    pub fn clear_writes(&mut self) {
        self.write_log.clear();
    }

    /// Number of handshake clears issued on a channel
    pub fn dreq_clears(&self, index: u8) -> u32 {
        self.dreq_clears.get(&index).copied().unwrap_or(0)
    }

    /// Make a channel ignore warm reset so it stays busy
    pub fn set_stuck(&mut self, index: u8, stuck: bool) {
        self.stuck.retain(|&i| i != index);
        if stuck {
            self.stuck.push(index);
        }
    }

    /// Latch interrupt bits on a channel
    pub fn raise(&mut self, index: u8, bits: u32) {
        let latched = self.get_register(index, INTSTA_OFFSET);
        self.set_register(index, INTSTA_OFFSET, latched | (bits & INT_ALL));
    }

    /// Copy bytes into the memory window
    pub fn load_memory(&mut self, addr: u32, data: &[u8]) {
        let start = Self::mem_offset(addr);
        self.memory[start..start + data.len()].copy_from_slice(data);
    }

    /// View bytes in the memory window
    pub fn memory(&self, addr: u32, len: usize) -> &[u8] {
        let start = Self::mem_offset(addr);
        &self.memory[start..start + len]
    }

    fn mem_offset(addr: u32) -> usize {
        let offset = addr
            .checked_sub(MOCK_MEM_BASE)
            .expect("address below mock memory window") as usize;
        assert!(offset < MOCK_MEM_SIZE, "address {addr:#x} outside mock memory window");
        offset
    }

    fn is_active(&self, index: u8) -> bool {
        let status = self.get_register(index, STATUS_OFFSET);
        status & STATUS_RUNNING != 0 && status & STATUS_PAUSED == 0
    }

    fn control_has(&self, index: u8, bit: u32) -> bool {
        self.get_register(index, CON_OFFSET) & bit != 0
    }

    /// Bytes held in a channel's FIFO, from the writer's point of view
    fn fifo_occupied(&self, index: u8) -> u32 {
        let size = self.get_register(index, FFSIZE_OFFSET);
        if size == 0 {
            return 0;
        }
        let hw = self.get_register(index, HWPTR_OFFSET);
        let sw = self.get_register(index, SWPTR_OFFSET);
        if self.control_has(index, CON_DIR) {
            (hw + size - sw) % size
        } else {
            (sw + size - hw) % size
        }
    }

    fn refresh_count(&mut self, index: u8) {
        let occupied = self.fifo_occupied(index);
        self.set_register(index, FFCNT_OFFSET, occupied);
    }

    // =========================================================================
    // Hardware Simulation
    // =========================================================================

    /// Peripheral pushes bytes into a receive FIFO
    ///
    /// Returns the number of bytes accepted, limited by free space. Nothing
    /// moves unless the channel is running and not paused.
    pub fn peripheral_fill(&mut self, index: u8, data: &[u8]) -> usize {
        let size = self.get_register(index, FFSIZE_OFFSET);
        if !self.is_active(index) || size == 0 {
            return 0;
        }
        let base = self.get_register(index, ADDR1_OFFSET);
        let hw = self.get_register(index, HWPTR_OFFSET);
        let space = (size - 1 - self.fifo_occupied(index)) as usize;
        let n = data.len().min(space);

        for (i, &byte) in data[..n].iter().enumerate() {
            let offset = (hw + i as u32) % size;
            self.load_memory(base + offset, &[byte]);
        }
        self.set_register(index, HWPTR_OFFSET, (hw + n as u32) % size);
        self.refresh_count(index);
        self.idle.insert(index, 0);

        let threshold = self.get_register(index, COUNT_OFFSET);
        if n > 0 && self.control_has(index, CON_ITEN) && self.fifo_occupied(index) >= threshold {
            self.raise(index, INT_PRIMARY);
        }
        n
    }

    /// Peripheral consumes bytes from a transmit FIFO
    ///
    /// Returns the number of bytes consumed, limited by the bytes queued.
    pub fn peripheral_drain(&mut self, index: u8, len: usize) -> usize {
        let size = self.get_register(index, FFSIZE_OFFSET);
        if !self.is_active(index) || size == 0 {
            return 0;
        }
        let hw = self.get_register(index, HWPTR_OFFSET);
        let n = len.min(self.fifo_occupied(index) as usize);

        self.set_register(index, HWPTR_OFFSET, (hw + n as u32) % size);
        self.refresh_count(index);
        self.idle.insert(index, 0);

        let threshold = self.get_register(index, COUNT_OFFSET);
        if n > 0 && self.control_has(index, CON_ITEN) && self.fifo_occupied(index) < threshold {
            self.raise(index, INT_PRIMARY);
        }
        n
    }

    /// Let bus cycles pass with no FIFO movement
    ///
    /// Latches the secondary (timeout) interrupt once the idle count reaches
    /// the programmed timeout.
    pub fn idle_cycles(&mut self, index: u8, cycles: u32) {
        let timeout = self.get_register(index, TIMEOUT_OFFSET);
        if !self.is_active(index) || timeout == 0 {
            return;
        }
        let idle = self.idle.entry(index).or_insert(0);
        *idle += cycles;
        if *idle >= timeout {
            *idle = 0;
            if self.control_has(index, CON_SECOND_ITEN) {
                self.raise(index, INT_SECONDARY);
            }
        }
    }

    /// Complete the current block transfer
    ///
    /// Reload channels rearm with the programmed count, others go idle.
    pub fn finish_transfer(&mut self, index: u8) {
        if self.control_has(index, CON_ITEN) {
            self.raise(index, INT_PRIMARY);
        }
        if self.control_has(index, CON_RELOAD) {
            let count = self.get_register(index, COUNT_OFFSET);
            self.set_register(index, RLCT_OFFSET, count);
        } else {
            self.set_register(index, RLCT_OFFSET, 0);
            self.set_register(index, STATUS_OFFSET, 0);
        }
    }

    /// Reach the midpoint of the current block transfer
    pub fn half_transfer(&mut self, index: u8) {
        let count = self.get_register(index, COUNT_OFFSET);
        self.set_register(index, RLCT_OFFSET, count / 2);
        if self.control_has(index, CON_SECOND_ITEN) {
            self.raise(index, INT_SECONDARY);
        }
    }

    fn apply(&mut self, index: u8, offset: usize, value: u32) {
        match offset {
            START_OFFSET => {
                if value & START_STR != 0 {
                    let count = self.get_register(index, COUNT_OFFSET);
                    self.set_register(index, RLCT_OFFSET, count);
                    self.set_register(index, STATUS_OFFSET, STATUS_RUNNING);
                    self.idle.insert(index, 0);
                }
                self.set_register(index, offset, value);
            }
            PAUSE_OFFSET => {
                let status = self.get_register(index, STATUS_OFFSET);
                let status = if value & PAUSE_PAUSE != 0 && status & STATUS_RUNNING != 0 {
                    status | STATUS_PAUSED
                } else {
                    status & !STATUS_PAUSED
                };
                self.set_register(index, STATUS_OFFSET, status);
                self.set_register(index, offset, value);
            }
            STOP_OFFSET => {
                if value & STOP_STOP != 0 {
                    self.set_register(index, STATUS_OFFSET, 0);
                }
            }
            RESET_OFFSET => {
                if self.stuck.contains(&index) {
                    return;
                }
                if value & RESET_HARD != 0 {
                    self.registers.retain(|&(i, _), _| i != index);
                } else if value & RESET_WARM != 0 {
                    for reg in [STATUS_OFFSET, INTSTA_OFFSET, START_OFFSET, PAUSE_OFFSET] {
                        self.set_register(index, reg, 0);
                    }
                }
            }
            ACK_OFFSET => {
                let latched = self.get_register(index, INTSTA_OFFSET);
                self.set_register(index, INTSTA_OFFSET, latched & !(value & INT_ALL));
                if value & ACK_CLR_DREQ != 0 {
                    *self.dreq_clears.entry(index).or_insert(0) += 1;
                }
            }
            FFSIZE_OFFSET => {
                self.set_register(index, offset, value);
                self.set_register(index, HWPTR_OFFSET, 0);
                self.set_register(index, SWPTR_OFFSET, 0);
                self.set_register(index, FFCNT_OFFSET, 0);
            }
            SWPTR_OFFSET => {
                self.set_register(index, offset, value);
                self.refresh_count(index);
            }
            INTSTA_OFFSET | RLCT_OFFSET | STATUS_OFFSET | HWPTR_OFFSET | FFCNT_OFFSET => {}
            _ => self.set_register(index, offset, value),
        }
    }
}

impl DmaBus for MockBus {
    fn read(&self, index: u8, offset: usize) -> u32 {
        self.get_register(index, offset)
    }

    fn write(&mut self, index: u8, offset: usize, value: u32) {
        self.write_log.push((index, offset, value));
        self.apply(index, offset, value);
    }

    fn read_memory(&self, addr: u32, dst: &mut [u8]) {
        dst.copy_from_slice(self.memory(addr, dst.len()));
    }
}

// =============================================================================
// Mock Clock Gate
// =============================================================================

/// Mock clock gate recording per-channel enables
#[derive(Debug, Default)]
pub struct MockClock {
    enabled: Vec<u8>,
    /// (channel, enabled) in call order
    events: Vec<(u8, bool)>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self, index: u8) -> bool {
        self.enabled.contains(&index)
    }

    pub fn events(&self) -> &[(u8, bool)] {
        &self.events
    }
}

impl ClockGate for MockClock {
    fn enable(&mut self, index: u8) {
        if !self.enabled.contains(&index) {
            self.enabled.push(index);
        }
        self.events.push((index, true));
    }

    fn disable(&mut self, index: u8) {
        self.enabled.retain(|&i| i != index);
        self.events.push((index, false));
    }
}

// =============================================================================
// Mock Interrupt Line
// =============================================================================

/// Interrupt line call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    Install,
    Enable,
    Disable,
}

/// Mock interrupt line recording every call
#[derive(Debug, Default)]
pub struct MockLine {
    events: Vec<LineEvent>,
}

impl MockLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[LineEvent] {
        &self.events
    }

    pub fn count(&self, event: LineEvent) -> usize {
        self.events.iter().filter(|&&e| e == event).count()
    }

    /// Whether the line ended up enabled
    pub fn is_enabled(&self) -> bool {
        self.events
            .iter()
            .rev()
            .find(|e| matches!(e, LineEvent::Enable | LineEvent::Disable))
            == Some(&LineEvent::Enable)
    }
}

impl InterruptLine for MockLine {
    fn install(&mut self) {
        self.events.push(LineEvent::Install);
    }

    fn enable(&mut self) {
        self.events.push(LineEvent::Enable);
    }

    fn disable(&mut self) {
        self.events.push(LineEvent::Disable);
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

// =============================================================================
// Recording Handler
// =============================================================================

/// Interrupt handler that records every call
#[derive(Debug, Default)]
pub struct Recorder {
    calls: Mutex<Vec<(ChannelId, InterruptCause)>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(ChannelId, InterruptCause)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.calls().len()
    }
}

impl InterruptHandler for Recorder {
    fn on_interrupt(&self, channel: ChannelId, cause: InterruptCause) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((channel, cause));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_bus_read_write() {
        let mut bus = MockBus::new();
        assert_eq!(bus.read(0, ADDR1_OFFSET), 0);

        bus.write(0, ADDR1_OFFSET, 0x1234);
        assert_eq!(bus.read(0, ADDR1_OFFSET), 0x1234);
        assert_eq!(bus.read(1, ADDR1_OFFSET), 0);
        assert_eq!(bus.writes(), &[(0, ADDR1_OFFSET, 0x1234)]);
    }

    #[test]
    fn read_only_registers_ignore_writes() {
        let mut bus = MockBus::new();
        bus.set_register(2, HWPTR_OFFSET, 8);
        bus.write(2, HWPTR_OFFSET, 0);
        bus.write(2, STATUS_OFFSET, STATUS_RUNNING);
        assert_eq!(bus.read(2, HWPTR_OFFSET), 8);
        assert_eq!(bus.read(2, STATUS_OFFSET), 0);
    }

    #[test]
    fn command_side_effects() {
        let mut bus = MockBus::new();
        bus.write(1, COUNT_OFFSET, 40);
        bus.write(1, START_OFFSET, START_STR);
        assert_eq!(bus.read(1, STATUS_OFFSET), STATUS_RUNNING);
        assert_eq!(bus.read(1, RLCT_OFFSET), 40);

        bus.write(1, PAUSE_OFFSET, PAUSE_PAUSE);
        assert_eq!(bus.read(1, STATUS_OFFSET), STATUS_RUNNING | STATUS_PAUSED);
        bus.write(1, PAUSE_OFFSET, 0);
        assert_eq!(bus.read(1, STATUS_OFFSET), STATUS_RUNNING);

        bus.write(1, STOP_OFFSET, STOP_STOP);
        assert_eq!(bus.read(1, STATUS_OFFSET), 0);
    }

    #[test]
    fn ack_clears_only_written_bits() {
        let mut bus = MockBus::new();
        bus.raise(4, INT_ALL);
        bus.write(4, ACK_OFFSET, INT_PRIMARY);
        assert_eq!(bus.read(4, INTSTA_OFFSET), INT_SECONDARY);
        bus.write(4, ACK_OFFSET, ACK_CLR_DREQ);
        assert_eq!(bus.read(4, INTSTA_OFFSET), INT_SECONDARY);
        assert_eq!(bus.dreq_clears(4), 1);
    }

    #[test]
    fn fifo_fill_respects_capacity() {
        let mut bus = MockBus::new();
        bus.write(13, ADDR1_OFFSET, MOCK_MEM_BASE);
        bus.write(13, FFSIZE_OFFSET, 8);
        bus.write(13, CON_OFFSET, CON_DIR);
        bus.write(13, START_OFFSET, START_STR);

        assert_eq!(bus.peripheral_fill(13, &[1, 2, 3, 4, 5, 6, 7, 8, 9]), 7);
        assert_eq!(bus.read(13, FFCNT_OFFSET), 7);
        assert_eq!(bus.memory(MOCK_MEM_BASE, 7), &[1, 2, 3, 4, 5, 6, 7]);

        bus.write(13, SWPTR_OFFSET, 4);
        assert_eq!(bus.read(13, FFCNT_OFFSET), 3);
    }

    #[test]
    fn mock_line_tracks_enable() {
        let mut line = MockLine::new();
        assert!(!line.is_enabled());
        line.install();
        line.enable();
        line.disable();
        assert!(!line.is_enabled());
        line.enable();
        assert!(line.is_enabled());
        assert_eq!(line.count(LineEvent::Install), 1);
    }

    #[test]
    fn mock_delay_tracking() {
        let mut delay = MockDelay::new();
        delay.delay_ns(1000);
        delay.delay_us(2);
        assert_eq!(delay.total_ns(), 3000);
        assert_eq!(delay.total_us(), 3);
    }
}
