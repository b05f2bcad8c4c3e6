//! Simulated controller link.
//!
//! A full-duplex in-memory byte link. The VCU side is a [`SimulatedSerial`]
//! that splits into receive/transmit halves for the pumps; the other end is a
//! [`SimulatedController`] that plays the external controller. Faults can be
//! injected on either direction, and hanging up closes the link so the pumps
//! wind down.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use vcu_common::frame::Frame;
use vcu_common::hal::serial::{SerialReceive, SerialTransmit, SerialTransport, TransportError};

/// Which end of the link is calling into a [`Channel`].
///
/// Injected faults only hit the VCU end; the controller end is test
/// scaffolding and always sees the raw byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Vcu,
    Controller,
}

#[derive(Debug, Default)]
struct Pipe {
    bytes: VecDeque<u8>,
    closed: bool,
    faults: u32,
}

impl Pipe {
    fn take_fault(&mut self, end: End) -> bool {
        if end == End::Vcu && self.faults > 0 {
            self.faults -= 1;
            true
        } else {
            false
        }
    }
}

/// One direction of the link.
#[derive(Debug, Default)]
struct Channel {
    pipe: Mutex<Pipe>,
    ready: Condvar,
}

impl Channel {
    fn write(&self, bytes: &[u8], end: End) -> Result<(), TransportError> {
        let mut pipe = self.pipe.lock();
        if pipe.take_fault(end) {
            return Err(TransportError::Io(io::Error::other("injected transmit fault")));
        }
        if pipe.closed {
            return Err(TransportError::Closed);
        }
        pipe.bytes.extend(bytes);
        self.ready.notify_all();
        Ok(())
    }

    /// Fill `buf` completely, waiting until `deadline` (or forever).
    ///
    /// Returns `Ok(false)` if the deadline passed first.
    fn read_exact(
        &self,
        buf: &mut [u8],
        deadline: Option<Instant>,
        end: End,
    ) -> Result<bool, TransportError> {
        let n = buf.len();
        let mut pipe = self.pipe.lock();
        loop {
            if pipe.take_fault(end) {
                return Err(TransportError::Io(io::Error::other("injected receive fault")));
            }
            if pipe.bytes.len() >= n {
                for (dst, src) in buf.iter_mut().zip(pipe.bytes.drain(..n)) {
                    *dst = src;
                }
                return Ok(true);
            }
            if pipe.closed {
                return Err(TransportError::Closed);
            }
            match deadline {
                Some(deadline) => {
                    if self.ready.wait_until(&mut pipe, deadline).timed_out() {
                        return Ok(false);
                    }
                }
                None => self.ready.wait(&mut pipe),
            }
        }
    }

    /// Arm one fault for the VCU end's next operation on this direction.
    fn inject_fault(&self) {
        let mut pipe = self.pipe.lock();
        pipe.faults += 1;
        self.ready.notify_all();
    }

    fn close(&self) {
        self.pipe.lock().closed = true;
        self.ready.notify_all();
    }

    fn len(&self) -> usize {
        self.pipe.lock().bytes.len()
    }
}

/// VCU side of a simulated link.
#[derive(Debug)]
pub struct SimulatedSerial {
    to_vcu: Arc<Channel>,
    to_controller: Arc<Channel>,
}

impl SimulatedSerial {
    /// Create a connected link and the controller end that drives it.
    pub fn pair() -> (SimulatedSerial, SimulatedController) {
        let to_vcu = Arc::new(Channel::default());
        let to_controller = Arc::new(Channel::default());
        (
            SimulatedSerial {
                to_vcu: Arc::clone(&to_vcu),
                to_controller: Arc::clone(&to_controller),
            },
            SimulatedController {
                to_vcu,
                to_controller,
            },
        )
    }
}

impl SerialTransport for SimulatedSerial {
    type Rx = SimulatedRx;
    type Tx = SimulatedTx;

    fn name(&self) -> String {
        "simulation".to_string()
    }

    fn split(self) -> (SimulatedRx, SimulatedTx) {
        (
            SimulatedRx {
                channel: self.to_vcu,
            },
            SimulatedTx {
                channel: self.to_controller,
            },
        )
    }
}

/// Receive half of a [`SimulatedSerial`].
#[derive(Debug)]
pub struct SimulatedRx {
    channel: Arc<Channel>,
}

impl SerialReceive for SimulatedRx {
    fn receive(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.channel.read_exact(buf, None, End::Vcu).map(|_| ())
    }
}

/// Transmit half of a [`SimulatedSerial`].
#[derive(Debug)]
pub struct SimulatedTx {
    channel: Arc<Channel>,
}

impl SerialTransmit for SimulatedTx {
    fn transmit(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.channel.write(buf, End::Vcu)
    }
}

/// The external controller's end of a simulated link.
///
/// Dropping it hangs up the link.
#[derive(Debug)]
pub struct SimulatedController {
    to_vcu: Arc<Channel>,
    to_controller: Arc<Channel>,
}

impl SimulatedController {
    /// Send raw bytes towards the VCU.
    pub fn send(&self, bytes: &[u8]) -> Result<(), TransportError> {
        self.to_vcu.write(bytes, End::Controller)
    }

    /// Send one frame towards the VCU.
    pub fn send_frame<const N: usize>(&self, frame: &Frame<N>) -> Result<(), TransportError> {
        self.send(frame.as_bytes())
    }

    /// Wait up to `timeout` for one frame from the VCU.
    ///
    /// Returns `None` on timeout or once the link is closed and drained.
    pub fn recv_frame<const N: usize>(&self, timeout: Duration) -> Option<Frame<N>> {
        let mut frame = Frame::<N>::zeroed();
        match self
            .to_controller
            .read_exact(
                frame.as_mut_bytes(),
                Some(Instant::now() + timeout),
                End::Controller,
            )
        {
            Ok(true) => Some(frame),
            Ok(false) => None,
            Err(e) => {
                debug!("Simulated controller receive ended: {}", e);
                None
            }
        }
    }

    /// Make the VCU's next receive fail with a transient I/O error.
    pub fn inject_receive_fault(&self) {
        self.to_vcu.inject_fault();
    }

    /// Make the VCU's next transmit fail with a transient I/O error.
    pub fn inject_transmit_fault(&self) {
        self.to_controller.inject_fault();
    }

    /// Bytes sent by the controller that the VCU has not read yet.
    pub fn unread_by_vcu(&self) -> usize {
        self.to_vcu.len()
    }

    /// Close both directions. Buffered bytes stay readable.
    pub fn hang_up(&self) {
        self.to_vcu.close();
        self.to_controller.close();
    }
}

impl Drop for SimulatedController {
    fn drop(&mut self) {
        self.hang_up();
    }
}
