//! Transport abstraction: any byte-oriented channel.
//!
//! Concrete implementations:
//! - UART console (`adapters::serial`, device only)
//! - in-memory loopback (tests)
//!
//! The [`CommandLink`](super::link::CommandLink) is generic over
//! `Transport`, so adding a new transport requires zero changes to the
//! verb handling.

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns the number of bytes actually read.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write all of `data` to the transport.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}
