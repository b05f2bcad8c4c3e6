//! Serial transport traits and error types.
//!
//! This module defines:
//! - `SerialTransport` trait - A full-duplex link that splits into halves
//! - `SerialReceive` / `SerialTransmit` traits - The halves owned by the pumps
//! - `TransportError` enum - Error types for link operations

use std::io;
use thiserror::Error;

/// Error types for serial link operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Transient I/O failure (framing error, overrun, timeout in the driver).
    /// The caller may retry immediately.
    #[error("Serial I/O error: {0}")]
    Io(#[source] io::Error),

    /// The link is gone for good (device removed, peer hung up).
    #[error("Serial link closed")]
    Closed,
}

impl TransportError {
    /// Classify an `io::Error` from a device read/write.
    ///
    /// End-of-file and broken pipes mean the link will never deliver again;
    /// everything else is treated as transient.
    pub fn from_io(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::NotConnected => Self::Closed,
            _ => Self::Io(err),
        }
    }

    /// Whether the pump owning this link half should stop.
    #[inline]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Receive half of a serial link.
pub trait SerialReceive: Send {
    /// Block until exactly `buf.len()` bytes were received.
    ///
    /// There is no timeout: a silent link blocks the caller indefinitely.
    fn receive(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;
}

/// Transmit half of a serial link.
pub trait SerialTransmit: Send {
    /// Block until all of `buf` was handed to the link.
    fn transmit(&mut self, buf: &[u8]) -> Result<(), TransportError>;
}

/// A full-duplex serial link.
///
/// The receive and transmit pumps run in separate execution contexts, so a
/// transport is split once at startup and each pump owns one half.
pub trait SerialTransport {
    /// Receive half.
    type Rx: SerialReceive + 'static;
    /// Transmit half.
    type Tx: SerialTransmit + 'static;

    /// Short identifier for logging (e.g., "simulation", "/dev/ttyUSB0").
    fn name(&self) -> String;

    /// Split into independently owned halves.
    fn split(self) -> (Self::Rx, Self::Tx);
}
