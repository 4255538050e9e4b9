//! Per-channel state machine.
//!
//! A [`ChannelEngine`] holds the software view of one channel: its fixed
//! type, lifecycle state, the validated configuration with its resolved
//! address roles, and the virtual-FIFO pointer tracker. Hardware is reached
//! only through the [`DmaBus`] passed into each call, so one bus serves every
//! channel.

use core::sync::atomic::{Ordering, compiler_fence};

use embedded_hal::delay::DelayNs;

use super::channel::{ChannelId, ChannelState, ChannelStatus};
use super::config::{AddressMap, ChannelConfig, ChannelType, TransferConfig};
use super::error::{Error, Result};
use super::param::ParamId;
use super::ring::RingPointerTracker;
use crate::hal::bus::DmaBus;
use crate::internal::constants::ADDRESS_ALIGN;
use crate::internal::register::channel::*;

// =============================================================================
// Stored Settings
// =============================================================================

/// Validated configuration plus its resolved address roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelSettings {
    config: ChannelConfig,
    map: AddressMap,
}

impl ChannelSettings {
    fn resolve(mut config: ChannelConfig) -> Self {
        let map = AddressMap::resolve(&config.transfer);
        config.control.src_inc = map.src_inc;
        config.control.dst_inc = map.dst_inc;
        Self { config, map }
    }

    /// Stored configuration, increment flags as programmed
    #[inline(always)]
    #[must_use]
    pub const fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Resolved address roles
    #[inline(always)]
    #[must_use]
    pub const fn map(&self) -> &AddressMap {
        &self.map
    }

    /// Value of the first address register
    #[inline(always)]
    #[must_use]
    pub const fn addr_1(&self) -> u32 {
        self.map.addr_1
    }

    /// Value of the second address register
    #[inline(always)]
    #[must_use]
    pub const fn addr_2(&self) -> u32 {
        self.map.addr_2
    }

    fn remap(&mut self) {
        *self = Self::resolve(self.config);
    }
}

// =============================================================================
// Register Dump
// =============================================================================

const DUMP_CAPACITY: usize = DUMP_REGISTERS.len();

/// Snapshot of one channel's registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDump {
    channel: ChannelId,
    values: [u32; DUMP_CAPACITY],
    len: usize,
}

impl RegisterDump {
    /// Channel the snapshot was taken from
    #[inline(always)]
    #[must_use]
    pub const fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Number of registers captured
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing was captured
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `(name, offset, value)` rows in address order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize, u32)> + '_ {
        DUMP_REGISTERS[..self.len]
            .iter()
            .zip(self.values.iter())
            .map(|(&(name, offset), &value)| (name, offset, value))
    }

    /// Value of the register called `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.iter()
            .find(|(reg, _, _)| *reg == name)
            .map(|(_, _, value)| value)
    }
}

// =============================================================================
// Channel Engine
// =============================================================================

/// Software state for one DMA channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEngine {
    index: u8,
    generation: u16,
    channel_type: ChannelType,
    state: ChannelState,
    settings: Option<ChannelSettings>,
    ring: Option<RingPointerTracker>,
}

impl ChannelEngine {
    /// Unconfigured, idle engine for hardware channel `index`
    #[must_use]
    pub const fn new(index: u8, channel_type: ChannelType) -> Self {
        Self {
            index,
            generation: 0,
            channel_type,
            state: ChannelState::Idle,
            settings: None,
            ring: None,
        }
    }

    pub(crate) const fn with_generation(mut self, generation: u16) -> Self {
        self.generation = generation;
        self
    }

    /// Hardware channel id
    #[inline(always)]
    #[must_use]
    pub const fn id(&self) -> ChannelId {
        ChannelId::with_generation(self.index, self.generation)
    }

    /// Channel hardware type
    #[inline(always)]
    #[must_use]
    pub const fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    /// Software lifecycle state
    #[inline(always)]
    #[must_use]
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Stored settings, `None` until configured
    #[inline(always)]
    #[must_use]
    pub const fn settings(&self) -> Option<&ChannelSettings> {
        self.settings.as_ref()
    }

    /// Virtual-FIFO pointer tracker, `None` unless a virtual FIFO is configured
    #[inline(always)]
    #[must_use]
    pub const fn ring(&self) -> Option<&RingPointerTracker> {
        self.ring.as_ref()
    }

    /// Fold hardware completion back into the software state
    ///
    /// A running channel whose hardware reports neither running nor paused
    /// has finished its transfer and is idle again.
    pub fn refresh<B: DmaBus>(&mut self, bus: &B) {
        if self.state == ChannelState::Running {
            let hw = bus.read(self.index, STATUS_OFFSET);
            if hw & (STATUS_RUNNING | STATUS_PAUSED) == 0 {
                debug!("dma ch{} transfer complete", self.index);
                self.state = ChannelState::Idle;
            }
        }
    }

    /// Validate and store a configuration
    ///
    /// Address roles are resolved here once. No register is touched until
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] unless the channel is idle; the stored
    ///   configuration is left unchanged
    /// - [`Error::InvalidArgument`] if the configuration does not fit this
    ///   channel type
    pub fn configure(&mut self, config: ChannelConfig) -> Result<()> {
        if self.state != ChannelState::Idle {
            warn!("dma ch{} configure rejected: {:?}", self.index, self.state);
            return Err(Error::Busy);
        }
        config.validate(self.channel_type)?;

        let ring = match &config.transfer {
            TransferConfig::VirtualFifo(p) => Some(RingPointerTracker::new(p.fifo_size, p.direction)?),
            _ => None,
        };
        self.settings = Some(ChannelSettings::resolve(config));
        self.ring = ring;
        debug!("dma ch{} configured as {:?}", self.index, self.channel_type);
        Ok(())
    }

    /// Program the hardware and arm the channel
    ///
    /// # Errors
    ///
    /// - [`Error::Busy`] if the channel is running or paused
    /// - [`Error::NullPointer`] if the channel was never configured
    pub fn start<B: DmaBus>(&mut self, bus: &mut B) -> Result<()> {
        if self.state != ChannelState::Idle {
            warn!("dma ch{} start rejected: {:?}", self.index, self.state);
            return Err(Error::Busy);
        }
        let settings = self.settings.ok_or(Error::NullPointer)?;

        bus.write(self.index, ACK_OFFSET, INT_ALL);
        self.program(bus, &settings);
        if let Some(ring) = self.ring.as_mut() {
            ring.rewind();
        }

        // Every configuration write lands before the channel is armed
        compiler_fence(Ordering::SeqCst);
        bus.write(self.index, START_OFFSET, START_STR);
        self.state = ChannelState::Running;
        debug!("dma ch{} started", self.index);
        Ok(())
    }

    fn program<B: DmaBus>(&self, bus: &mut B, settings: &ChannelSettings) {
        let i = self.index;
        let config = &settings.config;

        bus.write(i, ADDR1_OFFSET, settings.map.addr_1);
        bus.write(i, ADDR2_OFFSET, settings.map.addr_2);
        if let Some(wrap) = config.transfer.wrap() {
            bus.write(i, WPPT_OFFSET, wrap.point);
            bus.write(i, WPTO_OFFSET, wrap.to_addr);
        }
        bus.write(i, COUNT_OFFSET, config.transfer.hardware_count());
        bus.write(
            i,
            LIMITER_OFFSET,
            u32::from(config.transfer.bandwidth_limit()),
        );

        if let Some(vfifo) = config.transfer.vfifo() {
            // FFSIZE rewinds both pointers
            bus.write(i, FFSIZE_OFFSET, vfifo.fifo_size);
            bus.write(i, ALTLEN_OFFSET, vfifo.alert_len);
            bus.write(i, TIMEOUT_OFFSET, vfifo.timeout_cycles);
            bus.write(i, SWPTR_OFFSET, 0);
        }

        bus.write(i, CON_OFFSET, encode_control(config, &settings.map));
    }

    /// Halt the channel immediately
    ///
    /// Always succeeds; stopping an idle channel is a no-op for the state.
    pub fn stop<B: DmaBus>(&mut self, bus: &mut B) {
        bus.write(self.index, STOP_OFFSET, STOP_STOP);
        bus.write(self.index, START_OFFSET, 0);
        if self.state != ChannelState::Idle {
            debug!("dma ch{} stopped", self.index);
        }
        self.state = ChannelState::Idle;
    }

    /// Hold the channel after the current burst
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] unless the channel is running.
    pub fn pause<B: DmaBus>(&mut self, bus: &mut B) -> Result<()> {
        if self.state != ChannelState::Running {
            warn!("dma ch{} pause rejected: {:?}", self.index, self.state);
            return Err(Error::Busy);
        }
        bus.write(self.index, PAUSE_OFFSET, PAUSE_PAUSE);
        self.state = ChannelState::Paused;
        debug!("dma ch{} paused", self.index);
        Ok(())
    }

    /// Continue a paused channel from where it stopped
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] unless the channel is paused.
    pub fn resume<B: DmaBus>(&mut self, bus: &mut B) -> Result<()> {
        if self.state != ChannelState::Paused {
            warn!("dma ch{} resume rejected: {:?}", self.index, self.state);
            return Err(Error::Busy);
        }
        bus.write(self.index, PAUSE_OFFSET, 0);
        self.state = ChannelState::Running;
        debug!("dma ch{} resumed", self.index);
        Ok(())
    }

    /// Warm-reset the channel and clear its interrupt latches
    ///
    /// Polls the status register up to `attempts` times, `interval_us`
    /// apart, for the channel to go idle. The software state is idle
    /// afterwards whatever the outcome; the configuration is kept.
    ///
    /// # Errors
    ///
    /// [`Error::Busy`] if the hardware still reports activity after the
    /// last poll.
    pub fn reset<B: DmaBus, D: DelayNs>(
        &mut self,
        bus: &mut B,
        delay: &mut D,
        attempts: u32,
        interval_us: u32,
    ) -> Result<()> {
        bus.write(self.index, RESET_OFFSET, RESET_WARM);

        let mut settled = false;
        for _ in 0..attempts {
            if bus.read(self.index, STATUS_OFFSET) & (STATUS_RUNNING | STATUS_PAUSED) == 0 {
                settled = true;
                break;
            }
            delay.delay_us(interval_us);
        }

        bus.write(self.index, ACK_OFFSET, INT_ALL);
        self.state = ChannelState::Idle;
        if let Some(ring) = self.ring.as_mut() {
            ring.rewind();
        }

        if settled {
            debug!("dma ch{} reset", self.index);
            Ok(())
        } else {
            warn!("dma ch{} reset timed out", self.index);
            Err(Error::Busy)
        }
    }

    /// Hardware status bits
    ///
    /// Reads the status and latch registers together inside a critical
    /// section. Never blocks.
    pub fn status<B: DmaBus>(&self, bus: &B) -> ChannelStatus {
        let (hw, latched) = critical_section::with(|_| {
            (
                bus.read(self.index, STATUS_OFFSET),
                bus.read(self.index, INTSTA_OFFSET),
            )
        });

        let mut status = ChannelStatus::empty();
        status.set(ChannelStatus::INTERRUPT_PENDING, latched & INT_ALL != 0);
        status.set(ChannelStatus::RUNNING, hw & STATUS_RUNNING != 0);
        status.set(ChannelStatus::PAUSED, hw & STATUS_PAUSED != 0);
        status
    }

    /// Read and acknowledge the interrupt latches
    ///
    /// Returns the latch bits that were set. Each latch is cleared exactly
    /// once per call; an event that arrives after the read stays latched for
    /// the next scan.
    pub fn clear_interrupt_status<B: DmaBus>(&self, bus: &mut B) -> u32 {
        critical_section::with(|_| {
            let bits = bus.read(self.index, INTSTA_OFFSET) & INT_ALL;
            if bits != 0 {
                bus.write(self.index, ACK_OFFSET, bits);
            }
            bits
        })
    }

    /// Release the peripheral handshake request
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] on full-size channels, which have no
    /// peripheral side.
    pub fn clear_dreq<B: DmaBus>(&self, bus: &mut B) -> Result<()> {
        if !self.channel_type.has_peripheral_side() {
            return Err(Error::InvalidArgument);
        }
        bus.write(self.index, ACK_OFFSET, ACK_CLR_DREQ);
        Ok(())
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Read a parameter
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `id` does not exist on this channel
    ///   type, or hardware reports a pointer outside the FIFO
    /// - [`Error::NullPointer`] if the value lives in a configuration that
    ///   has not been stored yet
    pub fn get_param<B: DmaBus>(&mut self, bus: &B, id: ParamId) -> Result<u32> {
        if !id.applies_to(self.channel_type) {
            return Err(Error::InvalidArgument);
        }
        let settings = self.settings.as_ref().ok_or(Error::NullPointer)?;
        let transfer = &settings.config.transfer;
        match id {
            ParamId::RemainingLength => Ok(bus.read(self.index, RLCT_OFFSET)),
            ParamId::FixedAddress => transfer.fixed_address().ok_or(Error::InvalidArgument),
            ParamId::ProgrammableAddress => {
                transfer.programmable_address().ok_or(Error::InvalidArgument)
            }
            ParamId::FifoSize => transfer
                .vfifo()
                .map(|p| p.fifo_size)
                .ok_or(Error::InvalidArgument),
            ParamId::FifoCount => Ok(self.sync_ring(bus)?.occupied()),
            ParamId::HwPointer => Ok(self.sync_ring(bus)?.hw_ptr()),
            ParamId::SwPointer => self
                .ring
                .as_ref()
                .map(RingPointerTracker::sw_ptr)
                .ok_or(Error::NullPointer),
        }
    }

    /// Write a parameter
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `id` does not exist on this channel
    ///   type, is read-only, or `value` is misaligned / out of range
    /// - [`Error::NullPointer`] if the channel is not configured
    /// - [`Error::Busy`] when resizing the FIFO of a non-idle channel
    pub fn set_param<B: DmaBus>(&mut self, bus: &mut B, id: ParamId, value: u32) -> Result<()> {
        if !id.applies_to(self.channel_type) || !id.is_writable() {
            return Err(Error::InvalidArgument);
        }
        let settings = self.settings.as_mut().ok_or(Error::NullPointer)?;

        match id {
            ParamId::FixedAddress | ParamId::ProgrammableAddress => {
                if value % ADDRESS_ALIGN != 0 {
                    return Err(Error::InvalidArgument);
                }
                if let (ParamId::ProgrammableAddress, TransferConfig::VirtualFifo(params)) =
                    (id, &settings.config.transfer)
                    && value.checked_add(params.fifo_size).is_none()
                {
                    return Err(Error::InvalidArgument);
                }
                let offset = if id == ParamId::FixedAddress {
                    settings.config.transfer.set_fixed_address(value)?;
                    ADDR2_OFFSET
                } else {
                    settings.config.transfer.set_programmable_address(value)?;
                    ADDR1_OFFSET
                };
                settings.remap();
                bus.write(self.index, offset, value);
                Ok(())
            }
            ParamId::FifoSize => {
                if self.state != ChannelState::Idle {
                    return Err(Error::Busy);
                }
                let TransferConfig::VirtualFifo(params) = &mut settings.config.transfer else {
                    return Err(Error::InvalidArgument);
                };
                if value < params.threshold
                    || value < params.alert_len
                    || params.fifo_addr.checked_add(value).is_none()
                {
                    return Err(Error::InvalidArgument);
                }
                let ring = RingPointerTracker::new(value, params.direction)?;
                params.fifo_size = value;
                self.ring = Some(ring);
                bus.write(self.index, FFSIZE_OFFSET, value);
                Ok(())
            }
            _ => Err(Error::InvalidArgument),
        }
    }

    // =========================================================================
    // Virtual FIFO
    // =========================================================================

    fn vfifo_ring(&mut self) -> Result<&mut RingPointerTracker> {
        if self.channel_type != ChannelType::VirtualFifo {
            return Err(Error::InvalidArgument);
        }
        self.ring.as_mut().ok_or(Error::NullPointer)
    }

    fn sync_ring<B: DmaBus>(&mut self, bus: &B) -> Result<&mut RingPointerTracker> {
        let index = self.index;
        let ring = self.vfifo_ring()?;
        let hw_ptr = bus.read(index, HWPTR_OFFSET);
        if ring.sync_hw_pointer(hw_ptr).is_err() {
            warn!("dma ch{} HWPTR {} outside FIFO of {}", index, hw_ptr, ring.fifo_size());
            return Err(Error::InvalidArgument);
        }
        Ok(ring)
    }

    /// Advance SWPTR by `delta` bytes and hand it to hardware
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] on non-FIFO channels or if `delta`
    ///   exceeds the available data/space; nothing is written
    /// - [`Error::NullPointer`] if the FIFO is not configured
    pub fn update_software_pointer<B: DmaBus>(&mut self, bus: &mut B, delta: u32) -> Result<()> {
        let index = self.index;
        let ring = self.sync_ring(bus)?;
        let sw_ptr = ring.update_software_pointer(delta)?;
        bus.write(index, SWPTR_OFFSET, sw_ptr);
        Ok(())
    }

    /// Drain up to `max_length` bytes from the FIFO into `buffer`
    ///
    /// Returns the number of bytes copied, which may be zero.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] on non-FIFO channels and on
    ///   memory-to-peripheral FIFOs
    /// - [`Error::NullPointer`] if the FIFO is not configured
    pub fn read_fifo<B: DmaBus>(
        &mut self,
        bus: &mut B,
        buffer: &mut [u8],
        max_length: usize,
    ) -> Result<usize> {
        let index = self.index;
        let fifo_addr = self
            .settings
            .as_ref()
            .and_then(|s| s.config.transfer.programmable_address())
            .ok_or(Error::NullPointer)?;

        let ring = self.sync_ring(bus)?;
        let copied = ring.read(buffer, max_length, |offset, dst| {
            bus.read_memory(fifo_addr.wrapping_add(offset), dst);
        })?;
        let sw_ptr = ring.sw_ptr();
        if copied > 0 {
            bus.write(index, SWPTR_OFFSET, sw_ptr);
        }
        Ok(copied)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Capture this channel's registers
    pub fn dump_registers<B: DmaBus>(&self, bus: &B) -> RegisterDump {
        let len = if self.channel_type == ChannelType::VirtualFifo {
            DUMP_CAPACITY
        } else {
            DUMP_COMMON_REGISTERS
        };
        let mut values = [0u32; DUMP_CAPACITY];
        for (value, &(_, offset)) in values.iter_mut().zip(DUMP_REGISTERS[..len].iter()) {
            *value = bus.read(self.index, offset);
        }
        RegisterDump {
            channel: self.id(),
            values,
            len,
        }
    }
}
