//! Interrupt causes, callback registration and dispatch bookkeeping
//!
//! Every channel has two latches in its interrupt status register and two
//! callback slots. The cause behind each slot is fixed by the channel type:
//!
//! | Slot      | Full/half-size   | Virtual FIFO    |
//! |-----------|------------------|-----------------|
//! | Primary   | `Completion`     | `FifoThreshold` |
//! | Secondary | `HalfCompletion` | `FifoTimeout`   |
//!
//! Dispatch runs in two phases. Collection reads and acknowledges each
//! channel's latches inside a critical section and records which handlers
//! to call; firing then invokes them with no lock held.

use super::channel::ChannelId;
use super::config::{ChannelType, InterruptEnable};
use super::error::{Error, Result};
use crate::internal::constants::ISR_SLOTS;
use crate::internal::register::channel::{INT_PRIMARY, INT_SECONDARY};

// =============================================================================
// Causes and Slots
// =============================================================================

/// Interrupt cause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptCause {
    /// Transfer complete (full/half-size)
    Completion,
    /// Half of the transfer complete (full/half-size)
    HalfCompletion,
    /// FIFO threshold condition (virtual FIFO)
    FifoThreshold,
    /// No pointer movement within the timeout (virtual FIFO)
    FifoTimeout,
}

impl InterruptCause {
    /// Decode a raw cause id (1, 2, 4, 8)
    pub const fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0x1 => Ok(InterruptCause::Completion),
            0x2 => Ok(InterruptCause::HalfCompletion),
            0x4 => Ok(InterruptCause::FifoThreshold),
            0x8 => Ok(InterruptCause::FifoTimeout),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Raw cause id
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.enable_flag().bits()
    }

    /// Matching interrupt-enable flag
    #[must_use]
    pub const fn enable_flag(&self) -> InterruptEnable {
        match self {
            InterruptCause::Completion => InterruptEnable::COMPLETION,
            InterruptCause::HalfCompletion => InterruptEnable::HALF_COMPLETION,
            InterruptCause::FifoThreshold => InterruptEnable::FIFO_THRESHOLD,
            InterruptCause::FifoTimeout => InterruptEnable::FIFO_TIMEOUT,
        }
    }

    /// Callback slot this cause is delivered through
    #[must_use]
    pub const fn slot(&self) -> IsrSlot {
        match self {
            InterruptCause::Completion | InterruptCause::FifoThreshold => IsrSlot::Primary,
            InterruptCause::HalfCompletion | InterruptCause::FifoTimeout => IsrSlot::Secondary,
        }
    }

    /// Whether a channel of `channel_type` can raise this cause
    #[must_use]
    pub const fn is_supported_by(&self, channel_type: ChannelType) -> bool {
        channel_type
            .supported_interrupts()
            .contains(self.enable_flag())
    }

    /// Cause reported through `slot` on a channel of `channel_type`
    #[must_use]
    pub const fn for_slot(channel_type: ChannelType, slot: IsrSlot) -> Self {
        match (channel_type, slot) {
            (ChannelType::VirtualFifo, IsrSlot::Primary) => InterruptCause::FifoThreshold,
            (ChannelType::VirtualFifo, IsrSlot::Secondary) => InterruptCause::FifoTimeout,
            (_, IsrSlot::Primary) => InterruptCause::Completion,
            (_, IsrSlot::Secondary) => InterruptCause::HalfCompletion,
        }
    }
}

/// Interrupt callback slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IsrSlot {
    /// Completion or FIFO threshold
    Primary = 0,
    /// Half completion or FIFO timeout
    Secondary = 1,
}

impl IsrSlot {
    /// Both slots in firing order
    pub const ALL: [IsrSlot; ISR_SLOTS] = [IsrSlot::Primary, IsrSlot::Secondary];

    /// Status/acknowledge register bit for this slot
    #[must_use]
    pub const fn latch_bit(&self) -> u32 {
        match self {
            IsrSlot::Primary => INT_PRIMARY,
            IsrSlot::Secondary => INT_SECONDARY,
        }
    }
}

/// Latch bits for the slots an enable set turns on
pub(crate) const fn enable_slots(enable: InterruptEnable) -> u32 {
    let mut bits = 0;
    if enable.intersects(InterruptEnable::COMPLETION.union(InterruptEnable::FIFO_THRESHOLD)) {
        bits |= INT_PRIMARY;
    }
    if enable.intersects(InterruptEnable::HALF_COMPLETION.union(InterruptEnable::FIFO_TIMEOUT)) {
        bits |= INT_SECONDARY;
    }
    bits
}

// =============================================================================
// Handlers
// =============================================================================

/// Interrupt callback
///
/// Called from interrupt context with the line masked. Implementations
/// should set flags, wake tasks, or drain a virtual FIFO; they must not
/// reconfigure, start, or stop channels synchronously.
///
/// Any `Fn(ChannelId, InterruptCause) + Sync` closure is a handler, so the
/// context a callback needs travels with it.
pub trait InterruptHandler: Sync {
    /// Handle `cause` raised by `channel`
    fn on_interrupt(&self, channel: ChannelId, cause: InterruptCause);
}

impl<F> InterruptHandler for F
where
    F: Fn(ChannelId, InterruptCause) + Sync,
{
    #[inline]
    fn on_interrupt(&self, channel: ChannelId, cause: InterruptCause) {
        self(channel, cause);
    }
}

/// Callback registrations for one channel
#[derive(Clone, Copy, Default)]
pub struct IsrTable<'h> {
    slots: [Option<&'h dyn InterruptHandler>; ISR_SLOTS],
}

impl<'h> IsrTable<'h> {
    /// Table with no registrations
    pub const EMPTY: Self = Self {
        slots: [None; ISR_SLOTS],
    };

    /// Handler registered for `slot`
    #[inline]
    #[must_use]
    pub fn get(&self, slot: IsrSlot) -> Option<&'h dyn InterruptHandler> {
        self.slots[slot as usize]
    }

    /// Replace the handler for `slot`
    #[inline]
    pub fn set(&mut self, slot: IsrSlot, handler: Option<&'h dyn InterruptHandler>) {
        self.slots[slot as usize] = handler;
    }

    /// Whether any slot has a handler
    #[must_use]
    pub fn any(&self) -> bool {
        self.slots.iter().any(Option::is_some)
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }
}

impl core::fmt::Debug for IsrTable<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IsrTable")
            .field("primary", &self.slots[0].is_some())
            .field("secondary", &self.slots[1].is_some())
            .finish()
    }
}

// =============================================================================
// Dispatcher
// =============================================================================

/// Per-channel callback tables for the shared interrupt line
#[derive(Debug)]
pub struct InterruptDispatcher<'h, const N: usize> {
    tables: [IsrTable<'h>; N],
}

impl<'h, const N: usize> Default for InterruptDispatcher<'h, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'h, const N: usize> InterruptDispatcher<'h, N> {
    /// Dispatcher with no registrations
    pub const fn new() -> Self {
        Self {
            tables: [IsrTable::EMPTY; N],
        }
    }

    /// Register `handler` for `cause` on channel `index` of `channel_type`
    ///
    /// Overwrites any previous handler for the same slot.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the cause is not raised by this channel
    /// type or `index` is out of range. Registrations are left untouched.
    pub fn register(
        &mut self,
        index: u8,
        channel_type: ChannelType,
        cause: InterruptCause,
        handler: &'h dyn InterruptHandler,
    ) -> Result<()> {
        if !cause.is_supported_by(channel_type) {
            return Err(Error::InvalidArgument);
        }
        let table = self
            .tables
            .get_mut(index as usize)
            .ok_or(Error::InvalidArgument)?;
        table.set(cause.slot(), Some(handler));
        Ok(())
    }

    /// Register a handler by raw cause id
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for an unknown cause id, plus every
    /// [`register`](Self::register) error.
    pub fn register_raw(
        &mut self,
        index: u8,
        channel_type: ChannelType,
        raw_cause: u32,
        handler: &'h dyn InterruptHandler,
    ) -> Result<()> {
        let cause = InterruptCause::from_raw(raw_cause)?;
        self.register(index, channel_type, cause, handler)
    }

    /// Remove the handler for `cause` on channel `index`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the cause is not raised by this channel
    /// type or `index` is out of range.
    pub fn unregister(
        &mut self,
        index: u8,
        channel_type: ChannelType,
        cause: InterruptCause,
    ) -> Result<()> {
        if !cause.is_supported_by(channel_type) {
            return Err(Error::InvalidArgument);
        }
        let table = self
            .tables
            .get_mut(index as usize)
            .ok_or(Error::InvalidArgument)?;
        table.set(cause.slot(), None);
        Ok(())
    }

    /// Drop all registrations for channel `index`
    pub fn clear(&mut self, index: u8) {
        if let Some(table) = self.tables.get_mut(index as usize) {
            table.clear();
        }
    }

    /// Callback table for channel `index`
    #[must_use]
    pub fn table(&self, index: u8) -> Option<&IsrTable<'h>> {
        self.tables.get(index as usize)
    }
}

/// One callback to fire
#[derive(Clone, Copy)]
pub struct PendingEvent<'h> {
    /// Channel that raised the interrupt
    pub channel: ChannelId,
    /// What happened
    pub cause: InterruptCause,
    handler: &'h dyn InterruptHandler,
}

impl core::fmt::Debug for PendingEvent<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PendingEvent")
            .field("channel", &self.channel)
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

/// Events collected by one dispatch pass, in firing order
///
/// Channels are ordered by index; within a channel the primary cause comes
/// before the secondary one.
pub struct DispatchBatch<'h, const N: usize> {
    events: [[Option<PendingEvent<'h>>; ISR_SLOTS]; N],
    latched: usize,
}

impl<'h, const N: usize> DispatchBatch<'h, N> {
    /// Empty batch
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: [[None; ISR_SLOTS]; N],
            latched: 0,
        }
    }

    /// Record that channel `channel`'s latches `bits` were acknowledged
    ///
    /// Queues the handler for each latched slot that has one.
    pub fn record(
        &mut self,
        channel: ChannelId,
        channel_type: ChannelType,
        bits: u32,
        table: &IsrTable<'h>,
    ) {
        let Some(row) = self.events.get_mut(channel.index() as usize) else {
            return;
        };
        self.latched += 1;
        for slot in IsrSlot::ALL {
            if bits & slot.latch_bit() == 0 {
                continue;
            }
            if let Some(handler) = table.get(slot) {
                row[slot as usize] = Some(PendingEvent {
                    channel,
                    cause: InterruptCause::for_slot(channel_type, slot),
                    handler,
                });
            }
        }
    }

    /// Number of channels whose latches were acknowledged
    #[inline]
    #[must_use]
    pub const fn latched(&self) -> usize {
        self.latched
    }

    /// Whether no channel had a latch set
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.latched == 0
    }

    /// Queued events in firing order
    pub fn events(&self) -> impl Iterator<Item = &PendingEvent<'h>> {
        self.events.iter().flatten().flatten()
    }

    /// Invoke every queued handler; returns how many ran
    pub fn fire(&self) -> usize {
        let mut fired = 0;
        for event in self.events() {
            trace!("dma irq ch{} {:?}", event.channel.index(), event.cause);
            event.handler.on_interrupt(event.channel, event.cause);
            fired += 1;
        }
        fired
    }
}

impl<const N: usize> Default for DispatchBatch<'_, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Alternate `collect` and fire until a pass comes back empty
///
/// Runs at most `passes` passes (at least one). Returns the number of
/// callbacks invoked.
pub(crate) fn run_passes<'h, const N: usize, F>(passes: u32, mut collect: F) -> usize
where
    F: FnMut() -> DispatchBatch<'h, N>,
{
    let passes = passes.max(1);
    let mut fired = 0;
    for _ in 0..passes {
        let batch = collect();
        if batch.is_empty() {
            return fired;
        }
        fired += batch.fire();
    }
    warn!("dma irq still active after {} passes", passes);
    fired
}
