//! Error types for the link queues and facade.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Errors from bounded queue operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The queue stayed full for the whole wait window. Contents unchanged.
    #[error("Queue stayed full for {timeout:?}")]
    TimedOut {
        /// Wait window that elapsed
        timeout: Duration,
    },
}

/// Errors surfaced by [`CommLink`](crate::link::CommLink).
#[derive(Debug, Error)]
pub enum CommError {
    /// The outbound queue stayed full; the response was not queued.
    /// Retry or drop is the caller's decision.
    #[error("Response queue full: {0}")]
    ResponseQueueFull(#[source] QueueError),

    /// A pump thread could not be started.
    #[error("Failed to spawn {name} pump: {source}")]
    Spawn {
        /// Pump name
        name: &'static str,
        /// Source IO error
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comm_error_display() {
        let err = CommError::ResponseQueueFull(QueueError::TimedOut {
            timeout: Duration::from_millis(200),
        });
        let msg = err.to_string();
        assert!(msg.contains("Response queue full"));
        assert!(msg.contains("200ms"));
    }
}
