//! Error types for the DMA driver
//!
//! Every fallible operation returns [`Result`]. The three variants are local
//! and recoverable; the driver never retries on the caller's behalf.

/// DMA driver error
///
/// Numeric codes returned by [`Error::code`] follow the negative-errno
/// convention used by the C HAL for the same controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Channel slot was never allocated, was released, or has no stored
    /// configuration for the requested operation
    NullPointer,
    /// Unsupported channel type, parameter id, interrupt cause, or a value
    /// outside what the channel can address
    InvalidArgument,
    /// Operation is illegal in the channel's current state
    Busy,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Error::NullPointer => "channel not allocated or not configured",
            Error::InvalidArgument => "invalid argument",
            Error::Busy => "channel busy",
        }
    }

    /// Negative error code (`-1` null pointer, `-2` invalid argument,
    /// `-3` busy)
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Error::NullPointer => -1,
            Error::InvalidArgument => -2,
            Error::Busy => -3,
        }
    }
}

/// Result type alias for DMA operations
pub type Result<T> = core::result::Result<T, Error>;
