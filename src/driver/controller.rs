//! DMA controller facade
//!
//! [`DmaController`] owns the register bus, the platform collaborators and
//! one [`ChannelEngine`] slot per hardware channel. Channels are addressed
//! by the [`ChannelId`] returned from [`allocate`](DmaController::allocate).
//!
//! # Example
//!
//! ```ignore
//! use ph_mt3620_dma::chips::mt3620::{self, channel};
//! use ph_mt3620_dma::{ChannelConfig, FullSizeParams, InterruptCause, InterruptEnable};
//!
//! let bus = unsafe { mt3620::mmio_bus() };
//! let mut dma = mt3620::Mt3620Dma::new(bus, clocks, irq, delay, mt3620::LAYOUT);
//!
//! let ch = dma.allocate(channel::M2M)?;
//! dma.configure(
//!     ch,
//!     ChannelConfig::full_size(FullSizeParams::new(src, dst, 1024))
//!         .with_interrupts(InterruptEnable::COMPLETION),
//! )?;
//! dma.register_isr(ch, InterruptCause::Completion, &on_done)?;
//! dma.start(ch)?;
//! ```

use embedded_hal::delay::DelayNs;

use super::channel::{ChannelId, ChannelState, ChannelStatus};
use super::config::{ChannelConfig, ChannelType, ControllerConfig};
use super::engine::{ChannelEngine, ChannelSettings, RegisterDump};
use super::error::{Error, Result};
use super::interrupt::{
    DispatchBatch, InterruptCause, InterruptDispatcher, InterruptHandler, run_passes,
};
use super::param::ParamId;
use super::ring::RingPointerTracker;
use crate::hal::bus::DmaBus;
use crate::hal::clock::ClockGate;
use crate::hal::irq::InterruptLine;

/// Multi-channel DMA controller
///
/// `N` is the number of channel slots; `layout` fixes the hardware type of
/// each slot, with `None` for indices that have no channel. Callbacks must
/// outlive `'h`.
pub struct DmaController<'h, B, C, L, D, const N: usize> {
    bus: B,
    clock: C,
    line: L,
    delay: D,
    config: ControllerConfig,
    layout: [Option<ChannelType>; N],
    slots: [Option<ChannelEngine>; N],
    generations: [u16; N],
    dispatcher: InterruptDispatcher<'h, N>,
    line_installed: bool,
}

impl<'h, B, C, L, D, const N: usize> DmaController<'h, B, C, L, D, N>
where
    B: DmaBus,
    C: ClockGate,
    L: InterruptLine,
    D: DelayNs,
{
    /// Create a controller with default tunables
    ///
    /// No hardware is touched until the first [`allocate`](Self::allocate).
    pub const fn new(bus: B, clock: C, line: L, delay: D, layout: [Option<ChannelType>; N]) -> Self {
        Self {
            bus,
            clock,
            line,
            delay,
            config: ControllerConfig::new(),
            layout,
            slots: [const { None }; N],
            generations: [0; N],
            dispatcher: InterruptDispatcher::new(),
            line_installed: false,
        }
    }

    /// Replace the runtime tunables
    #[must_use]
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime tunables
    #[inline(always)]
    pub const fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Register bus
    #[inline(always)]
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutable register bus, bypassing the channel state machines
    #[inline(always)]
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Clock gate
    #[inline(always)]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Shared interrupt line
    #[inline(always)]
    pub const fn interrupt_line(&self) -> &L {
        &self.line
    }

    // =========================================================================
    // Slot Management
    // =========================================================================

    fn engine(&self, channel: ChannelId) -> Result<&ChannelEngine> {
        slot(&self.slots, channel)
    }

    /// Hardware type of slot `index`, if the slot exists
    #[must_use]
    pub fn slot_type(&self, index: u8) -> Option<ChannelType> {
        self.layout.get(index as usize).copied().flatten()
    }

    /// Whether slot `index` is currently allocated
    #[must_use]
    pub fn is_allocated(&self, index: u8) -> bool {
        self.slots
            .get(index as usize)
            .is_some_and(Option::is_some)
    }

    /// Claim channel `index`
    ///
    /// Ungates the channel clock. The first allocation also installs and
    /// unmasks the shared interrupt line.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `index` is out of range or has no
    ///   channel
    /// - [`Error::Busy`] if the channel is already allocated
    pub fn allocate(&mut self, index: u8) -> Result<ChannelId> {
        let Some(channel_type) = self.slot_type(index) else {
            warn!("dma ch{} does not exist", index);
            return Err(Error::InvalidArgument);
        };
        if self.is_allocated(index) {
            warn!("dma ch{} already allocated", index);
            return Err(Error::Busy);
        }

        self.clock.enable(index);
        if !self.line_installed {
            self.line.install();
            self.line.enable();
            self.line_installed = true;
        }
        let engine =
            ChannelEngine::new(index, channel_type).with_generation(self.generations[index as usize]);
        let id = engine.id();
        self.slots[index as usize] = Some(engine);
        info!("dma ch{} allocated ({:?})", index, channel_type);
        Ok(id)
    }

    /// Stop and give back a channel
    ///
    /// Settings, ring state and callbacks are discarded.
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] if the channel is not allocated.
    pub fn release(&mut self, channel: ChannelId) -> Result<()> {
        let index = channel.index();
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.stop(&mut self.bus);

        self.clock.disable(index);
        self.dispatcher.clear(index);
        self.slots[index as usize] = None;
        let generation = &mut self.generations[index as usize];
        *generation = generation.wrapping_add(1);
        info!("dma ch{} released", index);
        Ok(())
    }

    // =========================================================================
    // Channel Operations
    // =========================================================================

    /// Validate and store a configuration; see [`ChannelEngine::configure`]
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, plus every
    /// [`ChannelEngine::configure`] error.
    pub fn configure(&mut self, channel: ChannelId, config: ChannelConfig) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.refresh(&self.bus);
        engine.configure(config)
    }

    /// Program and arm the channel
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated or unconfigured channel,
    /// [`Error::Busy`] if it is already running or paused.
    pub fn start(&mut self, channel: ChannelId) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.refresh(&self.bus);
        engine.start(&mut self.bus)
    }

    /// Halt the channel immediately
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel.
    pub fn stop(&mut self, channel: ChannelId) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.stop(&mut self.bus);
        Ok(())
    }

    /// Pause a running channel
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, [`Error::Busy`]
    /// unless it is running.
    pub fn pause(&mut self, channel: ChannelId) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.refresh(&self.bus);
        engine.pause(&mut self.bus)
    }

    /// Resume a paused channel
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, [`Error::Busy`]
    /// unless it is paused.
    pub fn resume(&mut self, channel: ChannelId) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.resume(&mut self.bus)
    }

    /// Warm-reset the channel, polling for idle with the configured bound
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, [`Error::Busy`]
    /// if the hardware never settled.
    pub fn reset(&mut self, channel: ChannelId) -> Result<()> {
        let attempts = self.config.reset_poll_attempts;
        let interval_us = self.config.reset_poll_interval_us;
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.reset(&mut self.bus, &mut self.delay, attempts, interval_us)
    }

    /// Hardware status bits
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel.
    pub fn get_status(&self, channel: ChannelId) -> Result<ChannelStatus> {
        Ok(self.engine(channel)?.status(&self.bus))
    }

    /// Software lifecycle state, with hardware completion folded in
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel.
    pub fn state(&mut self, channel: ChannelId) -> Result<ChannelState> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.refresh(&self.bus);
        Ok(engine.state())
    }

    /// Hardware type of an allocated channel
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel.
    pub fn channel_type(&self, channel: ChannelId) -> Result<ChannelType> {
        Ok(self.engine(channel)?.channel_type())
    }

    /// Stored settings
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated or unconfigured channel.
    pub fn settings(&self, channel: ChannelId) -> Result<&ChannelSettings> {
        self.engine(channel)?.settings().ok_or(Error::NullPointer)
    }

    /// Virtual-FIFO pointer tracker
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel or one without a
    /// configured virtual FIFO.
    pub fn ring(&self, channel: ChannelId) -> Result<&RingPointerTracker> {
        self.engine(channel)?.ring().ok_or(Error::NullPointer)
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Read a parameter; see [`ParamId`]
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, plus every
    /// [`ChannelEngine::get_param`] error.
    pub fn get_param(&mut self, channel: ChannelId, id: ParamId) -> Result<u32> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.get_param(&self.bus, id)
    }

    /// Write a parameter; see [`ParamId`]
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, plus every
    /// [`ChannelEngine::set_param`] error.
    pub fn set_param(&mut self, channel: ChannelId, id: ParamId, value: u32) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.set_param(&mut self.bus, id, value)
    }

    /// Read a parameter by raw id
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unknown id, plus every
    /// [`get_param`](Self::get_param) error.
    pub fn get_param_raw(&mut self, channel: ChannelId, raw_id: u32) -> Result<u32> {
        self.get_param(channel, ParamId::from_raw(raw_id)?)
    }

    /// Write a parameter by raw id
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unknown id, plus every
    /// [`set_param`](Self::set_param) error.
    pub fn set_param_raw(&mut self, channel: ChannelId, raw_id: u32, value: u32) -> Result<()> {
        self.set_param(channel, ParamId::from_raw(raw_id)?, value)
    }

    // =========================================================================
    // Virtual FIFO
    // =========================================================================

    /// Advance the virtual-FIFO software pointer by `delta` bytes
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, plus every
    /// [`ChannelEngine::update_software_pointer`] error.
    pub fn update_software_pointer(&mut self, channel: ChannelId, delta: u32) -> Result<()> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.update_software_pointer(&mut self.bus, delta)
    }

    /// Drain up to `max_length` bytes from a receive FIFO
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel, plus every
    /// [`ChannelEngine::read_fifo`] error.
    pub fn read_fifo(
        &mut self,
        channel: ChannelId,
        buffer: &mut [u8],
        max_length: usize,
    ) -> Result<usize> {
        let engine = slot_mut(&mut self.slots, channel)?;
        engine.read_fifo(&mut self.bus, buffer, max_length)
    }

    // =========================================================================
    // Handshake / Diagnostics
    // =========================================================================

    /// Release the peripheral handshake request
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel,
    /// [`Error::InvalidArgument`] on full-size channels.
    pub fn clear_dreq(&mut self, channel: ChannelId) -> Result<()> {
        let engine = slot(&self.slots, channel)?;
        engine.clear_dreq(&mut self.bus)
    }

    /// Capture and log the channel's registers
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel.
    pub fn dump_registers(&self, channel: ChannelId) -> Result<RegisterDump> {
        let dump = self.engine(channel)?.dump_registers(&self.bus);
        info!("dma ch{} register dump", channel.index());
        for (name, offset, value) in dump.iter() {
            info!("  {} [{:#x}] = {:#x}", name, offset, value);
        }
        Ok(dump)
    }

    // =========================================================================
    // Interrupts
    // =========================================================================

    /// Register `handler` for `cause` on `channel`
    ///
    /// Replaces any earlier handler for the same cause.
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel,
    /// [`Error::InvalidArgument`] if the channel type never raises `cause`.
    pub fn register_isr(
        &mut self,
        channel: ChannelId,
        cause: InterruptCause,
        handler: &'h dyn InterruptHandler,
    ) -> Result<()> {
        let channel_type = self.engine(channel)?.channel_type();
        self.dispatcher
            .register(channel.index(), channel_type, cause, handler)
    }

    /// Register a handler by raw cause id (1, 2, 4 or 8)
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel,
    /// [`Error::InvalidArgument`] for an unknown or unsupported cause.
    pub fn register_isr_raw(
        &mut self,
        channel: ChannelId,
        raw_cause: u32,
        handler: &'h dyn InterruptHandler,
    ) -> Result<()> {
        let channel_type = self.engine(channel)?.channel_type();
        self.dispatcher
            .register_raw(channel.index(), channel_type, raw_cause, handler)
    }

    /// Drop the handler for `cause` on `channel`
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel,
    /// [`Error::InvalidArgument`] if the channel type never raises `cause`.
    pub fn unregister_isr(&mut self, channel: ChannelId, cause: InterruptCause) -> Result<()> {
        let channel_type = self.engine(channel)?.channel_type();
        self.dispatcher
            .unregister(channel.index(), channel_type, cause)
    }

    /// Read and acknowledge the channel's interrupt latches
    ///
    /// # Errors
    ///
    /// [`Error::NullPointer`] for an unallocated channel.
    pub fn clear_interrupt_status(&mut self, channel: ChannelId) -> Result<u32> {
        let engine = slot(&self.slots, channel)?;
        Ok(engine.clear_interrupt_status(&mut self.bus))
    }

    /// Acknowledge every pending channel and collect the callbacks to run
    ///
    /// Channels are scanned in index order. Nothing is invoked; call
    /// [`DispatchBatch::fire`] once any locks are released.
    pub fn collect_pending(&mut self) -> DispatchBatch<'h, N> {
        let mut batch = DispatchBatch::new();
        for engine in self.slots.iter().flatten() {
            let bits = engine.clear_interrupt_status(&mut self.bus);
            if bits == 0 {
                continue;
            }
            if let Some(table) = self.dispatcher.table(engine.id().index()) {
                batch.record(engine.id(), engine.channel_type(), bits, table);
            }
        }
        batch
    }

    pub(crate) fn mask_line(&mut self) {
        self.line.disable();
    }

    pub(crate) fn unmask_line(&mut self) {
        self.line.enable();
    }

    /// Service the shared interrupt line
    ///
    /// Masks the line, then alternates collecting and firing until no
    /// channel is pending or the pass bound is reached, and unmasks it
    /// again. Returns the number of callbacks invoked.
    pub fn handle_interrupt(&mut self) -> usize {
        let passes = self.config.max_dispatch_passes;
        self.mask_line();
        let fired = run_passes(passes, || self.collect_pending());
        self.unmask_line();
        fired
    }
}

fn slot<const N: usize>(
    slots: &[Option<ChannelEngine>; N],
    channel: ChannelId,
) -> Result<&ChannelEngine> {
    slots
        .get(channel.index() as usize)
        .and_then(Option::as_ref)
        .filter(|engine| engine.id() == channel)
        .ok_or(Error::NullPointer)
}

// Borrows only the slot array so the bus stays available alongside it
fn slot_mut<const N: usize>(
    slots: &mut [Option<ChannelEngine>; N],
    channel: ChannelId,
) -> Result<&mut ChannelEngine> {
    slots
        .get_mut(channel.index() as usize)
        .and_then(Option::as_mut)
        .filter(|engine| engine.id() == channel)
        .ok_or(Error::NullPointer)
}

#[cfg(test)]
mod tests {
    extern crate std;
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::driver::config::{
        FullSizeParams, HalfSizeParams, InterruptEnable, TransferDirection, VfifoParams,
    };
    use crate::internal::register::channel::*;
    use crate::testing::{
        LineEvent, MOCK_MEM_BASE, MockBus, MockClock, MockDelay, MockLine, Recorder,
    };

    const HALF: u8 = 0;
    const FULL: u8 = 2;
    const VFF: u8 = 3;

    type TestDma<'h> = DmaController<'h, MockBus, MockClock, MockLine, MockDelay, 4>;

    fn controller<'h>() -> TestDma<'h> {
        DmaController::new(
            MockBus::new(),
            MockClock::new(),
            MockLine::new(),
            MockDelay::new(),
            [
                Some(ChannelType::HalfSize),
                None,
                Some(ChannelType::FullSize),
                Some(ChannelType::VirtualFifo),
            ],
        )
    }

    fn full_config() -> ChannelConfig {
        ChannelConfig::full_size(FullSizeParams::new(0x1000, 0x2000, 64))
            .with_interrupts(InterruptEnable::COMPLETION)
    }

    fn rx_vfifo() -> ChannelConfig {
        ChannelConfig::virtual_fifo(
            VfifoParams::new(
                TransferDirection::PeripheralToMemory,
                MOCK_MEM_BASE,
                0x3800_0100,
                64,
                16,
            )
            .with_timeout(50),
        )
        .with_interrupts(InterruptEnable::FIFO_THRESHOLD | InterruptEnable::FIFO_TIMEOUT)
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    #[test]
    fn allocate_rejects_missing_slots() {
        let mut dma = controller();
        assert_eq!(dma.allocate(1), Err(Error::InvalidArgument));
        assert_eq!(dma.allocate(4), Err(Error::InvalidArgument));
        assert_eq!(dma.allocate(200), Err(Error::InvalidArgument));
        assert!(dma.interrupt_line().events().is_empty());
    }

    #[test]
    fn allocate_twice_is_busy() {
        let mut dma = controller();
        let ch = dma.allocate(FULL).unwrap();
        assert_eq!(ch.index(), FULL);
        assert_eq!(dma.allocate(FULL), Err(Error::Busy));
    }

    #[test]
    fn first_allocation_installs_line_once() {
        let mut dma = controller();
        dma.allocate(FULL).unwrap();
        dma.allocate(VFF).unwrap();

        let line = dma.interrupt_line();
        assert_eq!(line.count(LineEvent::Install), 1);
        assert_eq!(&line.events()[..2], &[LineEvent::Install, LineEvent::Enable]);
        assert!(dma.clock().is_enabled(FULL));
        assert!(dma.clock().is_enabled(VFF));
    }

    #[test]
    fn release_discards_everything() {
        let recorder = Recorder::new();
        let mut dma = controller();
        let ch = dma.allocate(FULL).unwrap();
        dma.configure(ch, full_config()).unwrap();
        dma.register_isr(ch, InterruptCause::Completion, &recorder)
            .unwrap();
        dma.start(ch).unwrap();

        dma.release(ch).unwrap();
        assert!(!dma.clock().is_enabled(FULL));
        assert!(!dma.is_allocated(FULL));
        assert_eq!(dma.bus().get_register(FULL, STATUS_OFFSET), 0);

        assert_eq!(dma.start(ch), Err(Error::NullPointer));
        assert_eq!(dma.get_status(ch), Err(Error::NullPointer));
        assert_eq!(dma.release(ch), Err(Error::NullPointer));
        assert_eq!(
            dma.register_isr(ch, InterruptCause::Completion, &recorder),
            Err(Error::NullPointer)
        );

        // A fresh allocation starts from scratch
        let ch = dma.allocate(FULL).unwrap();
        assert_eq!(dma.settings(ch).err(), Some(Error::NullPointer));
        assert_eq!(dma.start(ch), Err(Error::NullPointer));
        dma.bus_mut().raise(FULL, INT_PRIMARY);
        assert_eq!(dma.handle_interrupt(), 0);
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn stale_handle_rejected_after_reallocation() {
        let mut dma = controller();
        let old = dma.allocate(FULL).unwrap();
        dma.release(old).unwrap();

        let new = dma.allocate(FULL).unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);

        assert_eq!(dma.configure(old, full_config()), Err(Error::NullPointer));
        assert_eq!(dma.stop(old), Err(Error::NullPointer));
        assert_eq!(dma.release(old), Err(Error::NullPointer));
        assert!(dma.is_allocated(FULL));

        dma.configure(new, full_config()).unwrap();
        dma.start(new).unwrap();
        assert_eq!(dma.state(new), Ok(ChannelState::Running));
    }

    #[test]
    fn unallocated_operations_are_null() {
        let recorder = Recorder::new();
        let mut dma = controller();
        let ch = ChannelId::new(HALF);
        let mut buf = [0u8; 4];

        assert_eq!(dma.configure(ch, full_config()), Err(Error::NullPointer));
        assert_eq!(dma.stop(ch), Err(Error::NullPointer));
        assert_eq!(dma.pause(ch), Err(Error::NullPointer));
        assert_eq!(dma.resume(ch), Err(Error::NullPointer));
        assert_eq!(dma.reset(ch), Err(Error::NullPointer));
        assert_eq!(dma.state(ch), Err(Error::NullPointer));
        assert_eq!(
            dma.get_param(ch, ParamId::RemainingLength),
            Err(Error::NullPointer)
        );
        assert_eq!(dma.read_fifo(ch, &mut buf, 4), Err(Error::NullPointer));
        assert_eq!(dma.clear_dreq(ch), Err(Error::NullPointer));
        assert_eq!(dma.dump_registers(ch).err(), Some(Error::NullPointer));
        assert_eq!(
            dma.register_isr_raw(ch, 1, &recorder),
            Err(Error::NullPointer)
        );
        assert_eq!(dma.clear_interrupt_status(ch), Err(Error::NullPointer));
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    #[test]
    fn full_size_lifecycle() {
        let mut dma = controller();
        let ch = dma.allocate(FULL).unwrap();
        dma.configure(ch, full_config()).unwrap();
        dma.start(ch).unwrap();
        assert_eq!(dma.state(ch), Ok(ChannelState::Running));
        assert!(dma.get_status(ch).unwrap().contains(ChannelStatus::RUNNING));

        dma.pause(ch).unwrap();
        assert_eq!(dma.state(ch), Ok(ChannelState::Paused));
        assert_eq!(dma.configure(ch, full_config()), Err(Error::Busy));
        dma.resume(ch).unwrap();

        dma.bus_mut().finish_transfer(FULL);
        assert_eq!(dma.state(ch), Ok(ChannelState::Idle));
        assert_eq!(dma.get_param(ch, ParamId::RemainingLength), Ok(0));

        // restart after completion
        dma.start(ch).unwrap();
        dma.stop(ch).unwrap();
        dma.stop(ch).unwrap();
        assert_eq!(dma.state(ch), Ok(ChannelState::Idle));
    }

    #[test]
    fn reset_uses_configured_poll_bound() {
        let mut dma = controller().with_config(
            ControllerConfig::new()
                .with_reset_poll_attempts(3)
                .with_reset_poll_interval_us(20),
        );
        let ch = dma.allocate(FULL).unwrap();
        dma.configure(ch, full_config()).unwrap();
        dma.start(ch).unwrap();
        dma.bus_mut().set_stuck(FULL, true);

        assert_eq!(dma.reset(ch), Err(Error::Busy));
        assert_eq!(dma.state(ch), Ok(ChannelState::Idle));

        dma.bus_mut().set_stuck(FULL, false);
        dma.reset(ch).unwrap();
    }

    #[test]
    fn raw_params_decode() {
        let mut dma = controller();
        let ch = dma.allocate(VFF).unwrap();
        dma.configure(ch, rx_vfifo()).unwrap();

        assert_eq!(dma.get_param_raw(ch, 3), Ok(64));
        assert_eq!(dma.get_param_raw(ch, 0), Err(Error::InvalidArgument));
        assert_eq!(dma.get_param_raw(ch, 9), Err(Error::InvalidArgument));
        dma.set_param_raw(ch, 3, 128).unwrap();
        assert_eq!(dma.ring(ch).unwrap().fifo_size(), 128);
    }

    #[test]
    fn settings_expose_resolved_addresses() {
        let mut dma = controller();
        let ch = dma.allocate(HALF).unwrap();
        dma.configure(
            ch,
            ChannelConfig::half_size(HalfSizeParams::new(
                TransferDirection::PeripheralToMemory,
                0x2000_0000,
                0x3800_0000,
                32,
            )),
        )
        .unwrap();
        let settings = dma.settings(ch).unwrap();
        assert_eq!(settings.map().source(), 0x3800_0000);
        assert_eq!(settings.map().destination(), 0x2000_0000);
        assert_eq!(dma.channel_type(ch), Ok(ChannelType::HalfSize));
    }

    #[test]
    fn dump_registers_reads_without_writing() {
        let mut dma = controller();
        let ch = dma.allocate(HALF).unwrap();
        let writes = dma.bus().writes().len();
        let dump = dma.dump_registers(ch).unwrap();
        assert_eq!(dump.len(), DUMP_COMMON_REGISTERS);
        assert_eq!(dma.bus().writes().len(), writes);
    }

    // =========================================================================
    // Interrupt Dispatch
    // =========================================================================

    #[test]
    fn register_rejects_unsupported_cause_without_side_effects() {
        let recorder = Recorder::new();
        let mut dma = controller();
        let ch = dma.allocate(FULL).unwrap();
        dma.configure(ch, full_config()).unwrap();
        dma.register_isr(ch, InterruptCause::Completion, &recorder)
            .unwrap();

        assert_eq!(
            dma.register_isr(ch, InterruptCause::FifoTimeout, &recorder),
            Err(Error::InvalidArgument)
        );
        assert_eq!(
            dma.register_isr_raw(ch, 3, &recorder),
            Err(Error::InvalidArgument)
        );

        dma.start(ch).unwrap();
        dma.bus_mut().finish_transfer(FULL);
        assert_eq!(dma.handle_interrupt(), 1);
        assert_eq!(
            recorder.calls(),
            std::vec![(ch, InterruptCause::Completion)]
        );
    }

    #[test]
    fn dispatch_order_and_line_masking() {
        let recorder = Recorder::new();
        let mut dma = controller();
        let half = dma.allocate(HALF).unwrap();
        let vff = dma.allocate(VFF).unwrap();
        dma.register_isr(half, InterruptCause::Completion, &recorder)
            .unwrap();
        dma.register_isr_raw(half, 2, &recorder).unwrap();
        dma.register_isr(vff, InterruptCause::FifoThreshold, &recorder)
            .unwrap();
        dma.register_isr(vff, InterruptCause::FifoTimeout, &recorder)
            .unwrap();

        dma.bus_mut().raise(VFF, INT_ALL);
        dma.bus_mut().raise(HALF, INT_SECONDARY | INT_PRIMARY);
        let events_before = dma.interrupt_line().events().len();

        assert_eq!(dma.handle_interrupt(), 4);
        assert_eq!(
            recorder.calls(),
            std::vec![
                (half, InterruptCause::Completion),
                (half, InterruptCause::HalfCompletion),
                (vff, InterruptCause::FifoThreshold),
                (vff, InterruptCause::FifoTimeout),
            ]
        );

        let line = &dma.interrupt_line().events()[events_before..];
        assert_eq!(line, &[LineEvent::Disable, LineEvent::Enable]);

        // latches were acknowledged exactly once
        assert_eq!(dma.handle_interrupt(), 0);
        assert_eq!(recorder.count(), 4);
    }

    #[test]
    fn latched_without_handler_is_acked_silently() {
        let mut dma = controller();
        let ch = dma.allocate(FULL).unwrap();
        dma.bus_mut().raise(FULL, INT_PRIMARY);
        assert_eq!(dma.handle_interrupt(), 0);
        assert_eq!(dma.bus().get_register(FULL, INTSTA_OFFSET), 0);
        assert_eq!(dma.clear_interrupt_status(ch), Ok(0));
    }

    #[test]
    fn unregister_stops_callbacks() {
        let recorder = Recorder::new();
        let mut dma = controller();
        let ch = dma.allocate(HALF).unwrap();
        dma.register_isr(ch, InterruptCause::Completion, &recorder)
            .unwrap();
        dma.unregister_isr(ch, InterruptCause::Completion).unwrap();
        assert_eq!(
            dma.unregister_isr(ch, InterruptCause::FifoThreshold),
            Err(Error::InvalidArgument)
        );

        dma.bus_mut().raise(HALF, INT_PRIMARY);
        assert_eq!(dma.handle_interrupt(), 0);
        assert_eq!(recorder.count(), 0);
    }

    #[test]
    fn closure_handlers_capture_context() {
        let hits = AtomicUsize::new(0);
        let on_done = |_: ChannelId, _: InterruptCause| {
            hits.fetch_add(1, Ordering::SeqCst);
        };
        let mut dma = controller();
        let ch = dma.allocate(FULL).unwrap();
        dma.register_isr(ch, InterruptCause::Completion, &on_done)
            .unwrap();

        dma.bus_mut().raise(FULL, INT_PRIMARY);
        dma.handle_interrupt();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn vfifo_rx_flow_through_facade() {
        let recorder = Recorder::new();
        let mut dma = controller();
        let ch = dma.allocate(VFF).unwrap();
        dma.configure(ch, rx_vfifo()).unwrap();
        dma.register_isr(ch, InterruptCause::FifoThreshold, &recorder)
            .unwrap();
        dma.register_isr(ch, InterruptCause::FifoTimeout, &recorder)
            .unwrap();
        dma.start(ch).unwrap();

        dma.bus_mut().peripheral_fill(VFF, b"hello, world!!!!!");
        dma.bus_mut().idle_cycles(VFF, 50);
        assert_eq!(dma.handle_interrupt(), 2);

        let mut buf = [0u8; 32];
        let n = dma.read_fifo(ch, &mut buf, 32).unwrap();
        assert_eq!(&buf[..n], b"hello, world!!!!!");
        assert_eq!(dma.get_param(ch, ParamId::FifoCount), Ok(0));
        assert_eq!(dma.clear_dreq(ch), Ok(()));
    }
}
