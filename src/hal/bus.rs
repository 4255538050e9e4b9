//! Register Bus HAL
//!
//! The driver never dereferences addresses itself. Channel registers and the
//! virtual-FIFO memory are reached through a [`DmaBus`], addressed by channel
//! index plus register offset. [`MmioBus`] is the memory-mapped implementation
//! used on hardware; host tests substitute a simulated bus.

use crate::internal::register::{channel_reg_addr, read_bytes, read_reg, write_reg};

// =============================================================================
// Bus Trait
// =============================================================================

/// Raw access to channel registers and DMA-visible memory
pub trait DmaBus {
    /// Read the register at `offset` in channel `index`'s block
    fn read(&self, index: u8, offset: usize) -> u32;

    /// Write the register at `offset` in channel `index`'s block
    fn write(&mut self, index: u8, offset: usize, value: u32);

    /// Copy `dst.len()` bytes of memory starting at bus address `addr`
    fn read_memory(&self, addr: u32, dst: &mut [u8]);

    /// Read-modify-write a register
    #[inline]
    fn modify<F>(&mut self, index: u8, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read(index, offset);
        self.write(index, offset, f(value));
    }
}

// =============================================================================
// Memory-Mapped Bus
// =============================================================================

/// Memory-mapped register bus
///
/// Channel `i`'s block sits at `base + i * stride`.
#[derive(Debug)]
pub struct MmioBus {
    base: usize,
    stride: usize,
}

impl MmioBus {
    /// Create a bus over the register window at `base`
    ///
    /// # Safety
    ///
    /// `base + i * stride` must address a valid channel register block for
    /// every channel index the driver is used with, and every FIFO/transfer
    /// address handed to the driver must be readable memory. No other code
    /// may drive the same registers concurrently.
    pub const unsafe fn new(base: usize, stride: usize) -> Self {
        Self { base, stride }
    }

    /// Register window base address
    #[inline(always)]
    #[must_use]
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Distance between consecutive channel blocks
    #[inline(always)]
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    #[inline(always)]
    const fn addr(&self, index: u8, offset: usize) -> usize {
        channel_reg_addr(self.base, self.stride, index, offset)
    }
}

impl DmaBus for MmioBus {
    #[inline(always)]
    fn read(&self, index: u8, offset: usize) -> u32 {
        // SAFETY: validity of the register window is guaranteed by `MmioBus::new`
        unsafe { read_reg(self.addr(index, offset)) }
    }

    #[inline(always)]
    fn write(&mut self, index: u8, offset: usize, value: u32) {
        // SAFETY: validity of the register window is guaranteed by `MmioBus::new`
        unsafe { write_reg(self.addr(index, offset), value) }
    }

    fn read_memory(&self, addr: u32, dst: &mut [u8]) {
        // SAFETY: readability of FIFO memory is guaranteed by `MmioBus::new`
        unsafe { read_bytes(addr as usize, dst) }
    }
}
