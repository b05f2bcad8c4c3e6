//! Link counters.
//!
//! Updated lock-free by the pumps and the facade, read as a snapshot for
//! logging. Never used for control decisions.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared link counters.
#[derive(Debug, Default)]
pub struct LinkStats {
    frames_received: AtomicU64,
    requests_dropped: AtomicU64,
    rx_errors: AtomicU64,
    frames_sent: AtomicU64,
    tx_errors: AtomicU64,
    responses_rejected: AtomicU64,
}

/// Point-in-time copy of [`LinkStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkStatsSnapshot {
    /// Frames read from the link.
    pub frames_received: u64,
    /// Received frames discarded because the inbound queue stayed full.
    pub requests_dropped: u64,
    /// Transient receive failures.
    pub rx_errors: u64,
    /// Frames written to the link.
    pub frames_sent: u64,
    /// Transient transmit failures (frame lost).
    pub tx_errors: u64,
    /// `send_response` calls refused because the outbound queue stayed full.
    pub responses_rejected: u64,
}

macro_rules! counter {
    ($record:ident, $field:ident) => {
        #[doc = concat!("Increment `", stringify!($field), "`; returns the new value.")]
        #[inline]
        pub fn $record(&self) -> u64 {
            self.$field.fetch_add(1, Ordering::Relaxed) + 1
        }
    };
}

impl LinkStats {
    counter!(record_received, frames_received);
    counter!(record_request_dropped, requests_dropped);
    counter!(record_rx_error, rx_errors);
    counter!(record_sent, frames_sent);
    counter!(record_tx_error, tx_errors);
    counter!(record_response_rejected, responses_rejected);

    /// Read all counters.
    pub fn snapshot(&self) -> LinkStatsSnapshot {
        LinkStatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            requests_dropped: self.requests_dropped.load(Ordering::Relaxed),
            rx_errors: self.rx_errors.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            tx_errors: self.tx_errors.load(Ordering::Relaxed),
            responses_rejected: self.responses_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Rate limit for repeated warnings in the pump loops: the first 10
/// occurrences, then every 1000th.
#[inline]
pub(crate) fn should_log(count: u64) -> bool {
    count <= 10 || count % 1000 == 0
}
