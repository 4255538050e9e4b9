//! Memory-mapped register access
//!
//! Volatile primitives used by the MMIO bus implementation, plus the layout of
//! one channel's register block. All register access is volatile to ensure
//! proper hardware interaction.

pub mod channel;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

/// Copy bytes out of DMA-visible memory one volatile load at a time
///
/// # Safety
/// The caller must ensure `addr..addr + dst.len()` is readable memory.
#[inline]
pub unsafe fn read_bytes(addr: usize, dst: &mut [u8]) {
    for (i, byte) in dst.iter_mut().enumerate() {
        // SAFETY: caller guarantees the whole range is readable
        *byte = unsafe { core::ptr::read_volatile((addr + i) as *const u8) };
    }
}

/// Compute the address of `offset` within channel `index`'s register block
#[inline(always)]
#[must_use]
pub const fn channel_reg_addr(base: usize, stride: usize, index: u8, offset: usize) -> usize {
    base + index as usize * stride + offset
}
