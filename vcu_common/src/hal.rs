//! Hardware boundary traits and error types.
//!
//! The peripheral configuration code (clock tree, pin mux, UART/TIM init)
//! lives outside this workspace. This module defines what the core consumes
//! from it:
//!
//! - [`serial`] - fixed-size frame read/write over the controller link
//! - [`timer`] - one-shot hardware countdown timers and their identities

pub mod serial;
pub mod timer;
