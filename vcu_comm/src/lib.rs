//! # VCU Comm Library
//!
//! Message hand-off between the serial link to the external controller and
//! the VCU's control logic. Two bounded FIFO queues decouple blocking link
//! I/O from task-level consumers:
//!
//! ```text
//!  link ──► ReceivePump ──► inbound queue ──► CommLink::get_next_request()
//!                                                      │
//!                                               control logic
//!                                                      │
//!  link ◄── TransmitPump ◄── outbound queue ◄── CommLink::send_response()
//! ```
//!
//! # Module Structure
//!
//! - [`queue`] - Fixed-capacity blocking FIFO backed by inline storage
//! - [`pump`] - Receive/transmit workers moving frames between link and queues
//! - [`link`] - `CommLink` application facade and pump startup
//! - [`stats`] - Link counters for diagnostics
//! - [`transport`] - `std::io` backed serial transport (tty device files)
//! - [`error`] - Error types
//!
//! The pumps share nothing but the queues; every synchronisation point is a
//! queue operation.

#![deny(missing_docs)]

pub mod error;
pub mod link;
pub mod pump;
pub mod queue;
pub mod stats;
pub mod transport;

pub use crate::error::{CommError, QueueError};
pub use crate::link::{CommLink, PumpHandles, RequestQueue, ResponseQueue};
pub use crate::queue::BoundedQueue;
pub use crate::stats::{LinkStats, LinkStatsSnapshot};
