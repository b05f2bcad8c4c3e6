//! Prelude module for common re-exports.
//!
//! ```rust
//! use vcu_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    ConfigError, ConfigLoader, LinkConfig, LogLevel, SharedConfig, TimerConfig, VcuConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{LINK_QUEUE_CAPACITY, REP_SIZE, REQ_SIZE, TIMER_COUNT};

// ─── Frames ─────────────────────────────────────────────────────────
pub use crate::frame::{Frame, RequestFrame, ResponseFrame};

// ─── Hardware boundary ──────────────────────────────────────────────
pub use crate::hal::serial::{SerialReceive, SerialTransmit, SerialTransport, TransportError};
pub use crate::hal::timer::{IsrCallback, TimerError, TimerHal, TimerId, TimerState};
