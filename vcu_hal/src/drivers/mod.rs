//! HAL driver implementations.
//!
//! - [`simulation`] - Software simulation of the controller link and the
//!   one-shot timers, for development and testing without a board
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `SerialTransport` and/or `TimerHal` from `vcu_common::hal`
//! 3. Add export and documentation

pub mod simulation;
