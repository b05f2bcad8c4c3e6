//! `CommLink` application facade.
//!
//! The only interface control logic uses to talk to the external
//! controller. It owns the two link queues and starts the pumps that feed
//! and drain them.

use crate::error::CommError;
use crate::pump::{ReceivePump, TransmitPump};
use crate::queue::BoundedQueue;
use crate::stats::{LinkStats, LinkStatsSnapshot, should_log};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};
use vcu_common::config::LinkConfig;
use vcu_common::consts::LINK_QUEUE_CAPACITY;
use vcu_common::frame::{RequestFrame, ResponseFrame};
use vcu_common::hal::serial::{SerialReceive, SerialTransmit, SerialTransport};

/// Inbound queue: receive pump → application.
pub type RequestQueue = BoundedQueue<RequestFrame, LINK_QUEUE_CAPACITY>;

/// Outbound queue: application → transmit pump.
pub type ResponseQueue = BoundedQueue<ResponseFrame, LINK_QUEUE_CAPACITY>;

const RECEIVE_PUMP_NAME: &str = "vcu-rx";
const TRANSMIT_PUMP_NAME: &str = "vcu-tx";

/// Join handles of the two pump threads.
#[derive(Debug)]
pub struct PumpHandles {
    /// Receive pump thread.
    pub receive: JoinHandle<()>,
    /// Transmit pump thread.
    pub transmit: JoinHandle<()>,
}

impl PumpHandles {
    /// Whether both pumps have exited.
    ///
    /// The transmit pump only notices a closed link on its next write, so it
    /// can outlive the receive pump while the outbound queue stays empty.
    pub fn is_finished(&self) -> bool {
        self.receive.is_finished() && self.transmit.is_finished()
    }
}

/// Application facade over the controller link.
///
/// Cheap to clone; all clones share the same queues and counters.
#[derive(Clone)]
pub struct CommLink {
    inbound: Arc<RequestQueue>,
    outbound: Arc<ResponseQueue>,
    send_timeout: Duration,
    stats: Arc<LinkStats>,
}

impl CommLink {
    /// Create the queue pair without starting any pumps.
    ///
    /// Storage for both queues is reserved here, once.
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            inbound: Arc::new(RequestQueue::new()),
            outbound: Arc::new(ResponseQueue::new()),
            send_timeout: config.send_timeout(),
            stats: Arc::new(LinkStats::default()),
        }
    }

    /// Create the queue pair, split `transport` and start both pumps.
    ///
    /// # Errors
    /// `CommError::Spawn` if a pump thread cannot be created.
    pub fn start<T: SerialTransport>(
        transport: T,
        config: &LinkConfig,
    ) -> Result<(Self, PumpHandles), CommError> {
        let link = Self::new(config);
        let name = transport.name();
        let (rx, tx) = transport.split();
        let handles = link.spawn_pumps(rx, tx)?;
        info!(
            "Controller link '{}' up: queues {}x{}B in / {}x{}B out, send timeout {:?}",
            name,
            LINK_QUEUE_CAPACITY,
            RequestFrame::SIZE,
            LINK_QUEUE_CAPACITY,
            ResponseFrame::SIZE,
            link.send_timeout
        );
        Ok((link, handles))
    }

    /// Build a receive pump bound to this link's inbound queue.
    pub fn receive_pump<R: SerialReceive>(&self, rx: R) -> ReceivePump<R> {
        ReceivePump::new(
            rx,
            Arc::clone(&self.inbound),
            self.send_timeout,
            Arc::clone(&self.stats),
        )
    }

    /// Build a transmit pump bound to this link's outbound queue.
    pub fn transmit_pump<W: SerialTransmit>(&self, tx: W) -> TransmitPump<W> {
        TransmitPump::new(tx, Arc::clone(&self.outbound), Arc::clone(&self.stats))
    }

    /// Start both pumps on dedicated, equally prioritised threads.
    ///
    /// # Errors
    /// `CommError::Spawn` if a thread cannot be created.
    pub fn spawn_pumps<R, W>(&self, rx: R, tx: W) -> Result<PumpHandles, CommError>
    where
        R: SerialReceive + 'static,
        W: SerialTransmit + 'static,
    {
        let receive_pump = self.receive_pump(rx);
        let receive = thread::Builder::new()
            .name(RECEIVE_PUMP_NAME.to_string())
            .spawn(move || receive_pump.run())
            .map_err(|source| CommError::Spawn {
                name: RECEIVE_PUMP_NAME,
                source,
            })?;

        let transmit_pump = self.transmit_pump(tx);
        let transmit = thread::Builder::new()
            .name(TRANSMIT_PUMP_NAME.to_string())
            .spawn(move || transmit_pump.run())
            .map_err(|source| CommError::Spawn {
                name: TRANSMIT_PUMP_NAME,
                source,
            })?;

        Ok(PumpHandles { receive, transmit })
    }

    /// Next request from the controller. Blocks until one is available.
    pub fn get_next_request(&self) -> RequestFrame {
        self.inbound.dequeue()
    }

    /// Next request if one is already queued.
    pub fn try_next_request(&self) -> Option<RequestFrame> {
        self.inbound.try_dequeue()
    }

    /// Queue a response for the transmit pump.
    ///
    /// Waits up to the configured send timeout for space. The core does not
    /// retry on the caller's behalf.
    ///
    /// # Errors
    /// `CommError::ResponseQueueFull` if the outbound queue stayed full.
    pub fn send_response(&self, frame: ResponseFrame) -> Result<(), CommError> {
        self.outbound
            .enqueue(frame, self.send_timeout)
            .map_err(|e| {
                let count = self.stats.record_response_rejected();
                if should_log(count) {
                    warn!("Response {:02x?} rejected (#{}): {}", frame.as_bytes(), count, e);
                }
                CommError::ResponseQueueFull(e)
            })
    }

    /// Requests waiting in the inbound queue. Advisory, for instrumentation.
    pub fn pending_request_count(&self) -> usize {
        self.inbound.len()
    }

    /// Responses waiting in the outbound queue. Advisory, for instrumentation.
    pub fn pending_response_count(&self) -> usize {
        self.outbound.len()
    }

    /// Bounded wait used for both queue directions.
    pub fn send_timeout(&self) -> Duration {
        self.send_timeout
    }

    /// Snapshot of the link counters.
    pub fn stats(&self) -> LinkStatsSnapshot {
        self.stats.snapshot()
    }
}
