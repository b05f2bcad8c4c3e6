//! `std::io` backed serial transport.
//!
//! Wraps any blocking reader/writer pair, typically a tty device opened
//! read-write (`/dev/ttyUSB0`, `/dev/ttyS1`). Line settings (115200 8N1,
//! raw mode) belong to the device configuration and are expected to be set
//! before the link starts, e.g. with `stty`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use vcu_common::hal::serial::{SerialReceive, SerialTransmit, SerialTransport, TransportError};

/// Serial transport over a blocking reader and writer.
pub struct IoTransport<R, W> {
    name: String,
    reader: R,
    writer: W,
}

impl IoTransport<File, File> {
    /// Open a serial device read-write.
    ///
    /// # Errors
    /// `TransportError::Io` if the device cannot be opened or duplicated.
    pub fn open(path: &Path) -> Result<Self, TransportError> {
        let reader = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(TransportError::Io)?;
        let writer = reader.try_clone().map_err(TransportError::Io)?;
        Ok(Self::new(path.display().to_string(), reader, writer))
    }
}

impl<R, W> IoTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Wrap an existing reader/writer pair.
    pub fn new(name: impl Into<String>, reader: R, writer: W) -> Self {
        Self {
            name: name.into(),
            reader,
            writer,
        }
    }
}

impl<R, W> SerialTransport for IoTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    type Rx = IoRx<R>;
    type Tx = IoTx<W>;

    fn name(&self) -> String {
        self.name.clone()
    }

    fn split(self) -> (IoRx<R>, IoTx<W>) {
        (IoRx(self.reader), IoTx(self.writer))
    }
}

/// Receive half of an [`IoTransport`].
pub struct IoRx<R>(R);

impl<R: Read + Send> SerialReceive for IoRx<R> {
    fn receive(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.0.read_exact(buf).map_err(TransportError::from_io)
    }
}

/// Transmit half of an [`IoTransport`].
pub struct IoTx<W>(W);

impl<W: Write + Send> SerialTransmit for IoTx<W> {
    fn transmit(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.0.write_all(buf).map_err(TransportError::from_io)?;
        self.0.flush().map_err(TransportError::from_io)
    }
}
