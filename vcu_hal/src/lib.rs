//! # VCU HAL Library
//!
//! Interrupt-side glue between the hardware timers and application logic,
//! plus software simulation drivers for the serial link and timers.
//!
//! # Module Structure
//!
//! - [`dispatcher`] - One-shot timer callback dispatcher (interrupt entry point)
//! - [`drivers`] - HAL driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          vcu_hal                                 │
//! │  control logic ──arm()──►┌──────────────────┐                    │
//! │                          │ TimerDispatcher  │──start/stop──► TimerHal
//! │  TIMx IRQ ──on_period_──►│ [slot; 3]        │                    │
//! │             elapsed()    └────────┬─────────┘                    │
//! │                                   ▼                              │
//! │                            IsrCallback()                         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

#![deny(warnings)]
#![deny(missing_docs)]

pub mod dispatcher;
pub mod drivers;

pub use crate::dispatcher::{DispatcherStats, TimerDispatcher};
