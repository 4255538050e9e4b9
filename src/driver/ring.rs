//! Virtual-FIFO pointer tracking.
//!
//! The virtual FIFO is a circular region of `fifo_size` bytes shared by the
//! hardware pointer (HWPTR, moved only by the DMA engine) and the software
//! pointer (SWPTR, moved only through [`RingPointerTracker::update_software_pointer`]).
//!
//! Which pointer is the writer depends on the direction:
//!
//! ```text
//!  PeripheralToMemory            MemoryToPeripheral
//!  HWPTR writes, SWPTR reads     SWPTR writes, HWPTR reads
//!
//!  occupied = HWPTR - SWPTR      occupied = SWPTR - HWPTR   (mod fifo_size)
//! ```
//!
//! Both pointers equal means empty. The writer may therefore fill at most
//! `fifo_size - 1` bytes.

use super::config::TransferDirection;
use super::error::{Error, Result};
use crate::internal::constants::MAX_FIFO_SIZE;

/// HWPTR/SWPTR arithmetic for one virtual-FIFO channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingPointerTracker {
    fifo_size: u32,
    direction: TransferDirection,
    hw_ptr: u32,
    sw_ptr: u32,
}

impl RingPointerTracker {
    /// Empty ring of `fifo_size` bytes
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `fifo_size` is zero or larger than
    /// [`MAX_FIFO_SIZE`](crate::constants::MAX_FIFO_SIZE).
    pub const fn new(fifo_size: u32, direction: TransferDirection) -> Result<Self> {
        if fifo_size == 0 || fifo_size > MAX_FIFO_SIZE {
            return Err(Error::InvalidArgument);
        }
        Ok(Self {
            fifo_size,
            direction,
            hw_ptr: 0,
            sw_ptr: 0,
        })
    }

    /// FIFO capacity in bytes
    #[inline(always)]
    #[must_use]
    pub const fn fifo_size(&self) -> u32 {
        self.fifo_size
    }

    /// Direction the ring was configured for
    #[inline(always)]
    #[must_use]
    pub const fn direction(&self) -> TransferDirection {
        self.direction
    }

    /// Last observed hardware pointer
    #[inline(always)]
    #[must_use]
    pub const fn hw_ptr(&self) -> u32 {
        self.hw_ptr
    }

    /// Current software pointer
    #[inline(always)]
    #[must_use]
    pub const fn sw_ptr(&self) -> u32 {
        self.sw_ptr
    }

    /// Record a new hardware pointer snapshot
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `hw_ptr` is outside the ring; the
    /// previous snapshot is kept.
    pub fn sync_hw_pointer(&mut self, hw_ptr: u32) -> Result<()> {
        if hw_ptr >= self.fifo_size {
            return Err(Error::InvalidArgument);
        }
        self.hw_ptr = hw_ptr;
        Ok(())
    }

    /// Rewind both pointers to the start of the ring
    pub fn rewind(&mut self) {
        self.hw_ptr = 0;
        self.sw_ptr = 0;
    }

    /// Bytes between the writer and the reader
    #[inline]
    #[must_use]
    pub const fn occupied(&self) -> u32 {
        let (writer, reader) = match self.direction {
            TransferDirection::PeripheralToMemory => (self.hw_ptr, self.sw_ptr),
            TransferDirection::MemoryToPeripheral => (self.sw_ptr, self.hw_ptr),
        };
        (writer + self.fifo_size - reader) % self.fifo_size
    }

    /// Bytes the reader side can consume
    #[inline]
    #[must_use]
    pub const fn available_to_read(&self) -> u32 {
        self.occupied()
    }

    /// Bytes the writer side can still produce
    #[inline]
    #[must_use]
    pub const fn available_to_write(&self) -> u32 {
        self.fifo_size - 1 - self.occupied()
    }

    /// Whether the threshold interrupt condition holds
    ///
    /// Peripheral-to-memory rings signal when at least `threshold` bytes are
    /// waiting to be drained. Memory-to-peripheral rings signal when fewer
    /// than `threshold` bytes remain queued for the peripheral.
    #[must_use]
    pub const fn threshold_reached(&self, threshold: u32) -> bool {
        match self.direction {
            TransferDirection::PeripheralToMemory => self.occupied() >= threshold,
            TransferDirection::MemoryToPeripheral => self.occupied() < threshold,
        }
    }

    /// Advance SWPTR by `delta` bytes
    ///
    /// For peripheral-to-memory rings this marks data as consumed, for
    /// memory-to-peripheral rings it hands newly written data to hardware.
    /// Returns the new SWPTR.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] if `delta` exceeds the data available to
    /// read (P2M) or the space available to write (M2P). Nothing changes.
    pub fn update_software_pointer(&mut self, delta: u32) -> Result<u32> {
        let limit = match self.direction {
            TransferDirection::PeripheralToMemory => self.available_to_read(),
            TransferDirection::MemoryToPeripheral => self.available_to_write(),
        };
        if delta > limit {
            return Err(Error::InvalidArgument);
        }
        self.sw_ptr = (self.sw_ptr + delta) % self.fifo_size;
        Ok(self.sw_ptr)
    }

    /// Copy up to `max_length` received bytes into `buffer` and consume them
    ///
    /// `fetch(offset, dst)` fills `dst` from the FIFO region starting at byte
    /// `offset` of the ring; it is called at most twice, once per contiguous
    /// segment. Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] on a memory-to-peripheral ring, where SWPTR
    /// is the write side and there is nothing to receive.
    pub fn read<F>(&mut self, buffer: &mut [u8], max_length: usize, mut fetch: F) -> Result<usize>
    where
        F: FnMut(u32, &mut [u8]),
    {
        if matches!(self.direction, TransferDirection::MemoryToPeripheral) {
            return Err(Error::InvalidArgument);
        }
        let available = self.available_to_read() as usize;
        let len = available.min(max_length).min(buffer.len());
        if len == 0 {
            return Ok(0);
        }

        let start = self.sw_ptr;
        let to_end = (self.fifo_size - start) as usize;
        let first = len.min(to_end);
        let (head, tail) = buffer[..len].split_at_mut(first);
        fetch(start, head);
        if !tail.is_empty() {
            fetch(0, tail);
        }

        self.update_software_pointer(len as u32)?;
        Ok(len)
    }
}
