//! Receive and transmit pumps.
//!
//! Each pump is a long-running worker that owns one half of the serial link
//! and talks to the application only through a queue. A pump suspends only
//! on its transport call and on its queue operation; it holds no other
//! shared state.
//!
//! # Failure handling
//!
//! | Event                         | Receive pump           | Transmit pump        |
//! |-------------------------------|------------------------|----------------------|
//! | `TransportError::Io`          | discard, count, retry  | frame lost, count    |
//! | `TransportError::Closed`      | stop                   | stop                 |
//! | inbound queue full (timeout)  | drop frame, count      | n/a                  |

use crate::link::{RequestQueue, ResponseQueue};
use crate::stats::{LinkStats, should_log};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, trace, warn};
use vcu_common::frame::RequestFrame;
use vcu_common::hal::serial::{SerialReceive, SerialTransmit, TransportError};

/// Outcome of one pump iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStep {
    /// The frame reached its destination (queue or link).
    Forwarded,
    /// The frame was read but the inbound queue stayed full.
    Dropped,
    /// The transport reported a transient error.
    Faulted,
}

/// Moves request frames from the link into the inbound queue.
pub struct ReceivePump<R> {
    rx: R,
    inbound: Arc<RequestQueue>,
    send_timeout: Duration,
    stats: Arc<LinkStats>,
}

impl<R: SerialReceive> ReceivePump<R> {
    /// Create a pump feeding `inbound` with bounded waits of `send_timeout`.
    pub fn new(
        rx: R,
        inbound: Arc<RequestQueue>,
        send_timeout: Duration,
        stats: Arc<LinkStats>,
    ) -> Self {
        Self {
            rx,
            inbound,
            send_timeout,
            stats,
        }
    }

    /// Read one frame and queue it.
    ///
    /// # Errors
    /// Only `TransportError::Closed`; transient failures are absorbed and
    /// reported as [`PumpStep::Faulted`].
    pub fn step(&mut self) -> Result<PumpStep, TransportError> {
        let mut frame = RequestFrame::zeroed();
        match self.rx.receive(frame.as_mut_bytes()) {
            Ok(()) => {}
            Err(TransportError::Closed) => return Err(TransportError::Closed),
            Err(e) => {
                let count = self.stats.record_rx_error();
                if should_log(count) {
                    warn!("Receive error #{}: {}. Frame discarded", count, e);
                }
                return Ok(PumpStep::Faulted);
            }
        }
        self.stats.record_received();

        match self.inbound.enqueue(frame, self.send_timeout) {
            Ok(()) => {
                trace!("Request {:02x?} queued", frame.as_bytes());
                Ok(PumpStep::Forwarded)
            }
            Err(e) => {
                let count = self.stats.record_request_dropped();
                if should_log(count) {
                    warn!("Request {:02x?} dropped (#{}): {}", frame.as_bytes(), count, e);
                }
                Ok(PumpStep::Dropped)
            }
        }
    }

    /// Pump until the link closes.
    pub fn run(mut self) {
        info!("Receive pump started");
        loop {
            if let Err(e) = self.step() {
                info!("Receive pump stopped: {}", e);
                return;
            }
        }
    }
}

/// Moves response frames from the outbound queue onto the link.
pub struct TransmitPump<W> {
    tx: W,
    outbound: Arc<ResponseQueue>,
    stats: Arc<LinkStats>,
}

impl<W: SerialTransmit> TransmitPump<W> {
    /// Create a pump draining `outbound`.
    pub fn new(tx: W, outbound: Arc<ResponseQueue>, stats: Arc<LinkStats>) -> Self {
        Self {
            tx,
            outbound,
            stats,
        }
    }

    /// Wait for one response and write it.
    ///
    /// Delivery is best-effort: a transient write failure loses the frame,
    /// is counted, and is reported as [`PumpStep::Faulted`].
    ///
    /// # Errors
    /// Only `TransportError::Closed`; the dequeued frame is lost.
    pub fn step(&mut self) -> Result<PumpStep, TransportError> {
        let frame = self.outbound.dequeue();
        match self.tx.transmit(frame.as_bytes()) {
            Ok(()) => {
                self.stats.record_sent();
                trace!("Response {:02x?} sent", frame.as_bytes());
                Ok(PumpStep::Forwarded)
            }
            Err(TransportError::Closed) => Err(TransportError::Closed),
            Err(e) => {
                let count = self.stats.record_tx_error();
                if should_log(count) {
                    warn!("Transmit error #{}: {}. Response {:02x?} lost", count, e, frame.as_bytes());
                }
                Ok(PumpStep::Faulted)
            }
        }
    }

    /// Pump until the link closes.
    pub fn run(mut self) {
        info!("Transmit pump started");
        loop {
            if let Err(e) = self.step() {
                info!("Transmit pump stopped: {}", e);
                return;
            }
        }
    }
}
