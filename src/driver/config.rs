//! Channel configuration types
//!
//! A channel is configured with a [`ChannelConfig`]: a [`ControlMode`] shared
//! by every channel type, a [`TransferConfig`] variant carrying only the
//! fields meaningful for that type, and the [`InterruptEnable`] set.
//!
//! The two address registers mean different things per channel type. They are
//! resolved once into an [`AddressMap`] when the channel is configured.

use bitflags::bitflags;

use super::error::{Error, Result};
use crate::internal::constants::{
    MAX_BURST_BYTES, MAX_DISPATCH_PASSES, MAX_FIFO_SIZE, RESET_POLL_ATTEMPTS, RESET_POLL_INTERVAL_US,
};

// =============================================================================
// Channel Type / Direction
// =============================================================================

/// Physical channel hardware type
///
/// Fixed per slot by the chip layout; a channel never changes type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ChannelType {
    /// Memory-to-memory channel, both addresses free-running
    FullSize = 0,
    /// Peripheral/memory channel with one fixed and one programmable address
    HalfSize = 1,
    /// Half-size channel with a circular buffer engine on the memory side
    VirtualFifo = 2,
}

impl ChannelType {
    /// Decode a raw channel type value
    pub const fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(ChannelType::FullSize),
            1 => Ok(ChannelType::HalfSize),
            2 => Ok(ChannelType::VirtualFifo),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Whether the channel serves a peripheral (has a fixed-side address)
    #[inline(always)]
    #[must_use]
    pub const fn has_peripheral_side(&self) -> bool {
        !matches!(self, ChannelType::FullSize)
    }

    /// Interrupt causes this channel type can raise
    #[must_use]
    pub const fn supported_interrupts(&self) -> InterruptEnable {
        match self {
            ChannelType::FullSize | ChannelType::HalfSize => {
                InterruptEnable::COMPLETION.union(InterruptEnable::HALF_COMPLETION)
            }
            ChannelType::VirtualFifo => {
                InterruptEnable::FIFO_THRESHOLD.union(InterruptEnable::FIFO_TIMEOUT)
            }
        }
    }
}

/// Transfer direction for peripheral channels
///
/// Not meaningful for [`ChannelType::FullSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferDirection {
    /// Memory is read, peripheral is written (TX)
    #[default]
    MemoryToPeripheral = 0,
    /// Peripheral is read, memory is written (RX)
    PeripheralToMemory = 1,
}

impl TransferDirection {
    /// Decode a raw direction value
    pub const fn from_raw(raw: u32) -> Result<Self> {
        match raw {
            0 => Ok(TransferDirection::MemoryToPeripheral),
            1 => Ok(TransferDirection::PeripheralToMemory),
            _ => Err(Error::InvalidArgument),
        }
    }
}

// =============================================================================
// Control Mode
// =============================================================================

/// Beats per burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BurstSize {
    /// One beat per request
    #[default]
    Single,
    /// 4-beat incrementing burst
    Beat4,
    /// 8-beat incrementing burst
    Beat8,
    /// 16-beat incrementing burst
    Beat16,
}

impl BurstSize {
    /// Number of beats in one burst
    #[must_use]
    pub const fn beats(&self) -> u32 {
        match self {
            BurstSize::Single => 1,
            BurstSize::Beat4 => 4,
            BurstSize::Beat8 => 8,
            BurstSize::Beat16 => 16,
        }
    }

    /// Hardware burst-type code
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            BurstSize::Single => 0,
            BurstSize::Beat4 => 2,
            BurstSize::Beat8 => 4,
            BurstSize::Beat16 => 6,
        }
    }
}

/// Width of one transfer unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TransferSize {
    /// 1 byte
    #[default]
    Byte = 0,
    /// 2 bytes
    Short = 1,
    /// 4 bytes
    Long = 2,
}

impl TransferSize {
    /// Unit width in bytes
    #[must_use]
    pub const fn bytes(&self) -> u32 {
        match self {
            TransferSize::Byte => 1,
            TransferSize::Short => 2,
            TransferSize::Long => 4,
        }
    }
}

/// Which address an address wrap applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WrapSide {
    /// Wrap the source address
    #[default]
    Source,
    /// Wrap the destination address
    Destination,
}

/// Channel control mode
///
/// The address-increment flags are overwritten by the channel-type address
/// mapping at configure time; their values here only matter for reading back
/// a stored configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlMode {
    /// Beats per burst
    pub burst: BurstSize,
    /// Transfer unit width
    pub size: TransferSize,
    /// Increment the source address after each unit
    pub src_inc: bool,
    /// Increment the destination address after each unit
    pub dst_inc: bool,
    /// Enable address wrap
    pub wrap_enable: bool,
    /// Address side the wrap applies to
    pub wrap_side: WrapSide,
    /// Word-to-byte / byte-to-word conversion (half-size only)
    pub word_byte_conversion: bool,
    /// Throttle bus usage with the bandwidth limiter
    pub throttle: bool,
}

impl Default for ControlMode {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlMode {
    /// Single-beat byte transfers, no wrap, no throttling
    pub const fn new() -> Self {
        Self {
            burst: BurstSize::Single,
            size: TransferSize::Byte,
            src_inc: false,
            dst_inc: false,
            wrap_enable: false,
            wrap_side: WrapSide::Source,
            word_byte_conversion: false,
            throttle: false,
        }
    }

    /// Set the burst size
    #[must_use]
    pub const fn with_burst(mut self, burst: BurstSize) -> Self {
        self.burst = burst;
        self
    }

    /// Set the transfer unit width
    #[must_use]
    pub const fn with_size(mut self, size: TransferSize) -> Self {
        self.size = size;
        self
    }

    /// Enable address wrap on the given side
    #[must_use]
    pub const fn with_wrap(mut self, side: WrapSide) -> Self {
        self.wrap_enable = true;
        self.wrap_side = side;
        self
    }

    /// Enable or disable word/byte conversion
    #[must_use]
    pub const fn with_word_byte_conversion(mut self, enabled: bool) -> Self {
        self.word_byte_conversion = enabled;
        self
    }

    /// Enable or disable bandwidth throttling
    #[must_use]
    pub const fn with_throttle(mut self, enabled: bool) -> Self {
        self.throttle = enabled;
        self
    }

    /// Bytes moved by one burst
    #[inline(always)]
    #[must_use]
    pub const fn burst_bytes(&self) -> u32 {
        self.burst.beats() * self.size.bytes()
    }

    /// Whether the burst/unit combination is one the bus can issue
    #[inline(always)]
    #[must_use]
    pub const fn is_burst_compatible(&self) -> bool {
        self.burst_bytes() <= MAX_BURST_BYTES
    }
}

// =============================================================================
// Transfer Parameters
// =============================================================================

/// Address wrap point and target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WrapTarget {
    /// Transfer count at which the wrap happens
    pub point: u32,
    /// Address jumped to at the wrap point
    pub to_addr: u32,
}

/// FIFO alert comparison mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AlertCompare {
    /// Alert while the FIFO count is at or below the alert length
    #[default]
    LessThanOrEqual = 0,
    /// Alert while the FIFO count is above the alert length
    GreaterThan = 1,
}

/// Full-size (memory-to-memory) transfer parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FullSizeParams {
    /// Source address
    pub source: u32,
    /// Destination address
    pub destination: u32,
    /// Transfer length in bytes
    pub count: u32,
    /// Optional address wrap
    pub wrap: Option<WrapTarget>,
    /// Bandwidth limiter value
    pub bandwidth_limit: u8,
}

impl FullSizeParams {
    /// Copy `count` bytes from `source` to `destination`
    pub const fn new(source: u32, destination: u32, count: u32) -> Self {
        Self {
            source,
            destination,
            count,
            wrap: None,
            bandwidth_limit: 0,
        }
    }

    /// Set the address wrap point and target
    #[must_use]
    pub const fn with_wrap(mut self, point: u32, to_addr: u32) -> Self {
        self.wrap = Some(WrapTarget { point, to_addr });
        self
    }

    /// Set the bandwidth limiter value
    #[must_use]
    pub const fn with_bandwidth_limit(mut self, limit: u8) -> Self {
        self.bandwidth_limit = limit;
        self
    }
}

/// Half-size (peripheral/memory) transfer parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HalfSizeParams {
    /// Transfer direction
    pub direction: TransferDirection,
    /// Programmable-side (memory) address
    pub memory_addr: u32,
    /// Fixed-side (peripheral) address
    pub peripheral_addr: u32,
    /// Transfer length in bytes
    pub count: u32,
    /// Optional address wrap
    pub wrap: Option<WrapTarget>,
    /// Restart the transfer automatically on completion
    pub reload: bool,
    /// Bandwidth limiter value
    pub bandwidth_limit: u8,
}

impl HalfSizeParams {
    /// Move `count` bytes between `memory_addr` and `peripheral_addr`
    pub const fn new(
        direction: TransferDirection,
        memory_addr: u32,
        peripheral_addr: u32,
        count: u32,
    ) -> Self {
        Self {
            direction,
            memory_addr,
            peripheral_addr,
            count,
            wrap: None,
            reload: false,
            bandwidth_limit: 0,
        }
    }

    /// Set the address wrap point and target
    #[must_use]
    pub const fn with_wrap(mut self, point: u32, to_addr: u32) -> Self {
        self.wrap = Some(WrapTarget { point, to_addr });
        self
    }

    /// Enable or disable reload-on-completion
    #[must_use]
    pub const fn with_reload(mut self, reload: bool) -> Self {
        self.reload = reload;
        self
    }

    /// Set the bandwidth limiter value
    #[must_use]
    pub const fn with_bandwidth_limit(mut self, limit: u8) -> Self {
        self.bandwidth_limit = limit;
        self
    }
}

/// Virtual-FIFO transfer parameters
///
/// `threshold` is the FIFO alert threshold programmed into the count
/// register. It is not a transfer length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VfifoParams {
    /// Transfer direction
    pub direction: TransferDirection,
    /// Start of the circular FIFO region in memory
    pub fifo_addr: u32,
    /// Fixed-side (peripheral) address
    pub peripheral_addr: u32,
    /// FIFO capacity in bytes
    pub fifo_size: u32,
    /// Threshold interrupt level in bytes
    pub threshold: u32,
    /// Alert comparison mode
    pub alert_compare: AlertCompare,
    /// Alert length in bytes
    pub alert_len: u32,
    /// Bus cycles without pointer movement before the timeout interrupt,
    /// 0 to disable
    pub timeout_cycles: u32,
    /// Bandwidth limiter value
    pub bandwidth_limit: u8,
}

impl VfifoParams {
    /// Stream through a `fifo_size`-byte ring at `fifo_addr`
    pub const fn new(
        direction: TransferDirection,
        fifo_addr: u32,
        peripheral_addr: u32,
        fifo_size: u32,
        threshold: u32,
    ) -> Self {
        Self {
            direction,
            fifo_addr,
            peripheral_addr,
            fifo_size,
            threshold,
            alert_compare: AlertCompare::LessThanOrEqual,
            alert_len: 0,
            timeout_cycles: 0,
            bandwidth_limit: 0,
        }
    }

    /// Set the alert comparison mode and length
    #[must_use]
    pub const fn with_alert(mut self, compare: AlertCompare, len: u32) -> Self {
        self.alert_compare = compare;
        self.alert_len = len;
        self
    }

    /// Set the no-new-data timeout in bus cycles
    #[must_use]
    pub const fn with_timeout(mut self, cycles: u32) -> Self {
        self.timeout_cycles = cycles;
        self
    }

    /// Set the bandwidth limiter value
    #[must_use]
    pub const fn with_bandwidth_limit(mut self, limit: u8) -> Self {
        self.bandwidth_limit = limit;
        self
    }
}

/// Type-dependent transfer parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferConfig {
    /// Memory-to-memory transfer
    FullSize(FullSizeParams),
    /// Peripheral/memory transfer
    HalfSize(HalfSizeParams),
    /// Virtual-FIFO streaming
    VirtualFifo(VfifoParams),
}

impl TransferConfig {
    /// Channel type these parameters apply to
    #[must_use]
    pub const fn channel_type(&self) -> ChannelType {
        match self {
            TransferConfig::FullSize(_) => ChannelType::FullSize,
            TransferConfig::HalfSize(_) => ChannelType::HalfSize,
            TransferConfig::VirtualFifo(_) => ChannelType::VirtualFifo,
        }
    }

    /// Transfer direction, `None` for full-size transfers
    #[must_use]
    pub const fn direction(&self) -> Option<TransferDirection> {
        match self {
            TransferConfig::FullSize(_) => None,
            TransferConfig::HalfSize(p) => Some(p.direction),
            TransferConfig::VirtualFifo(p) => Some(p.direction),
        }
    }

    /// Value programmed into the count register
    ///
    /// Byte count for full/half-size, FIFO alert threshold for virtual FIFO.
    #[must_use]
    pub const fn hardware_count(&self) -> u32 {
        match self {
            TransferConfig::FullSize(p) => p.count,
            TransferConfig::HalfSize(p) => p.count,
            TransferConfig::VirtualFifo(p) => p.threshold,
        }
    }

    /// Address wrap target, if any
    #[must_use]
    pub const fn wrap(&self) -> Option<WrapTarget> {
        match self {
            TransferConfig::FullSize(p) => p.wrap,
            TransferConfig::HalfSize(p) => p.wrap,
            TransferConfig::VirtualFifo(_) => None,
        }
    }

    /// Bandwidth limiter value
    #[must_use]
    pub const fn bandwidth_limit(&self) -> u8 {
        match self {
            TransferConfig::FullSize(p) => p.bandwidth_limit,
            TransferConfig::HalfSize(p) => p.bandwidth_limit,
            TransferConfig::VirtualFifo(p) => p.bandwidth_limit,
        }
    }

    /// Reload-on-completion flag
    #[must_use]
    pub const fn reload(&self) -> bool {
        matches!(self, TransferConfig::HalfSize(p) if p.reload)
    }

    /// Virtual-FIFO parameters, if this is a virtual-FIFO transfer
    #[must_use]
    pub const fn vfifo(&self) -> Option<&VfifoParams> {
        match self {
            TransferConfig::VirtualFifo(p) => Some(p),
            _ => None,
        }
    }

    /// Fixed-side (peripheral) address
    #[must_use]
    pub const fn fixed_address(&self) -> Option<u32> {
        match self {
            TransferConfig::FullSize(_) => None,
            TransferConfig::HalfSize(p) => Some(p.peripheral_addr),
            TransferConfig::VirtualFifo(p) => Some(p.peripheral_addr),
        }
    }

    /// Programmable-side (memory) address
    #[must_use]
    pub const fn programmable_address(&self) -> Option<u32> {
        match self {
            TransferConfig::FullSize(_) => None,
            TransferConfig::HalfSize(p) => Some(p.memory_addr),
            TransferConfig::VirtualFifo(p) => Some(p.fifo_addr),
        }
    }

    pub(crate) fn set_fixed_address(&mut self, addr: u32) -> Result<()> {
        match self {
            TransferConfig::FullSize(_) => return Err(Error::InvalidArgument),
            TransferConfig::HalfSize(p) => p.peripheral_addr = addr,
            TransferConfig::VirtualFifo(p) => p.peripheral_addr = addr,
        }
        Ok(())
    }

    pub(crate) fn set_programmable_address(&mut self, addr: u32) -> Result<()> {
        match self {
            TransferConfig::FullSize(_) => return Err(Error::InvalidArgument),
            TransferConfig::HalfSize(p) => p.memory_addr = addr,
            TransferConfig::VirtualFifo(p) => p.fifo_addr = addr,
        }
        Ok(())
    }

    fn validate(&self, control: &ControlMode) -> Result<()> {
        if control.wrap_enable && self.wrap().is_none() {
            return Err(Error::InvalidArgument);
        }
        if control.word_byte_conversion && !matches!(self, TransferConfig::HalfSize(_)) {
            return Err(Error::InvalidArgument);
        }
        match self {
            TransferConfig::FullSize(FullSizeParams { count, .. })
            | TransferConfig::HalfSize(HalfSizeParams { count, .. }) => {
                if *count == 0 {
                    return Err(Error::InvalidArgument);
                }
            }
            TransferConfig::VirtualFifo(p) => {
                if p.fifo_size == 0
                    || p.fifo_size > MAX_FIFO_SIZE
                    || p.threshold > p.fifo_size
                    || p.alert_len > p.fifo_size
                {
                    return Err(Error::InvalidArgument);
                }
                // the whole ring must sit below the top of the address space
                if p.fifo_addr.checked_add(p.fifo_size).is_none() {
                    return Err(Error::InvalidArgument);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Interrupt Enable Set
// =============================================================================

bitflags! {
    /// Interrupt causes enabled on a channel
    ///
    /// Completion/half-completion apply to full- and half-size channels,
    /// threshold/timeout to virtual-FIFO channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InterruptEnable: u32 {
        /// Transfer complete
        const COMPLETION = 1 << 0;
        /// Half of the transfer complete
        const HALF_COMPLETION = 1 << 1;
        /// FIFO threshold condition
        const FIFO_THRESHOLD = 1 << 2;
        /// No FIFO pointer movement within the timeout
        const FIFO_TIMEOUT = 1 << 3;
    }
}

impl Default for InterruptEnable {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InterruptEnable {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "InterruptEnable({=u32:#x})", self.bits());
    }
}

// =============================================================================
// Channel Configuration
// =============================================================================

/// Complete configuration for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Control mode
    pub control: ControlMode,
    /// Type-dependent transfer parameters
    pub transfer: TransferConfig,
    /// Enabled interrupt causes
    pub interrupts: InterruptEnable,
}

impl ChannelConfig {
    /// Configuration for arbitrary transfer parameters with a default
    /// control mode and no interrupts
    pub const fn new(transfer: TransferConfig) -> Self {
        Self {
            control: ControlMode::new(),
            transfer,
            interrupts: InterruptEnable::empty(),
        }
    }

    /// Full-size transfer configuration
    pub const fn full_size(params: FullSizeParams) -> Self {
        Self::new(TransferConfig::FullSize(params))
    }

    /// Half-size transfer configuration
    pub const fn half_size(params: HalfSizeParams) -> Self {
        Self::new(TransferConfig::HalfSize(params))
    }

    /// Virtual-FIFO configuration
    pub const fn virtual_fifo(params: VfifoParams) -> Self {
        Self::new(TransferConfig::VirtualFifo(params))
    }

    /// Set the control mode
    #[must_use]
    pub const fn with_control(mut self, control: ControlMode) -> Self {
        self.control = control;
        self
    }

    /// Set the enabled interrupt causes
    #[must_use]
    pub const fn with_interrupts(mut self, interrupts: InterruptEnable) -> Self {
        self.interrupts = interrupts;
        self
    }

    /// Channel type this configuration targets
    #[must_use]
    pub const fn channel_type(&self) -> ChannelType {
        self.transfer.channel_type()
    }

    /// Check the configuration against a channel of type `channel_type`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if the variant does not match the channel
    /// type, the burst size is incompatible with the unit size, or any
    /// type-specific field is out of range.
    pub fn validate(&self, channel_type: ChannelType) -> Result<()> {
        if self.transfer.channel_type() != channel_type {
            return Err(Error::InvalidArgument);
        }
        if !self.control.is_burst_compatible() {
            return Err(Error::InvalidArgument);
        }
        if !channel_type.supported_interrupts().contains(self.interrupts) {
            return Err(Error::InvalidArgument);
        }
        self.transfer.validate(&self.control)
    }
}

// =============================================================================
// Address Mapping
// =============================================================================

/// Resolved register address roles
///
/// `addr_1` is always the side that increments for peripheral channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressMap {
    /// First address register value
    pub addr_1: u32,
    /// Second address register value
    pub addr_2: u32,
    /// Source address increments
    pub src_inc: bool,
    /// Destination address increments
    pub dst_inc: bool,
    /// Direction for peripheral channels
    pub direction: Option<TransferDirection>,
}

impl AddressMap {
    /// Resolve the address roles for a transfer
    #[must_use]
    pub const fn resolve(transfer: &TransferConfig) -> Self {
        let (programmable, fixed, direction) = match transfer {
            TransferConfig::FullSize(p) => {
                return Self {
                    addr_1: p.source,
                    addr_2: p.destination,
                    src_inc: true,
                    dst_inc: true,
                    direction: None,
                };
            }
            TransferConfig::HalfSize(p) => (p.memory_addr, p.peripheral_addr, p.direction),
            TransferConfig::VirtualFifo(p) => (p.fifo_addr, p.peripheral_addr, p.direction),
        };
        let memory_is_source = matches!(direction, TransferDirection::MemoryToPeripheral);
        Self {
            addr_1: programmable,
            addr_2: fixed,
            src_inc: memory_is_source,
            dst_inc: !memory_is_source,
            direction: Some(direction),
        }
    }

    /// Address data is read from
    #[must_use]
    pub const fn source(&self) -> u32 {
        match self.direction {
            Some(TransferDirection::PeripheralToMemory) => self.addr_2,
            _ => self.addr_1,
        }
    }

    /// Address data is written to
    #[must_use]
    pub const fn destination(&self) -> u32 {
        match self.direction {
            Some(TransferDirection::PeripheralToMemory) => self.addr_1,
            _ => self.addr_2,
        }
    }
}

// =============================================================================
// Controller Configuration
// =============================================================================

/// Runtime tunables for [`DmaController`](crate::DmaController)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// Status polls while waiting for a warm reset to settle
    pub reset_poll_attempts: u32,
    /// Delay between reset polls in microseconds
    pub reset_poll_interval_us: u32,
    /// Collect/fire passes per interrupt entry
    pub max_dispatch_passes: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerConfig {
    /// Default tunables
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reset_poll_attempts: RESET_POLL_ATTEMPTS,
            reset_poll_interval_us: RESET_POLL_INTERVAL_US,
            max_dispatch_passes: MAX_DISPATCH_PASSES,
        }
    }

    /// Set the number of reset polls
    #[must_use]
    pub const fn with_reset_poll_attempts(mut self, attempts: u32) -> Self {
        self.reset_poll_attempts = attempts;
        self
    }

    /// Set the delay between reset polls
    #[must_use]
    pub const fn with_reset_poll_interval_us(mut self, interval_us: u32) -> Self {
        self.reset_poll_interval_us = interval_us;
        self
    }

    /// Set the dispatch pass bound; zero is treated as one pass
    #[must_use]
    pub const fn with_max_dispatch_passes(mut self, passes: u32) -> Self {
        self.max_dispatch_passes = passes;
        self
    }
}
