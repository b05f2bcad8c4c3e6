//! Simulation driver module.
//!
//! This module provides software stand-ins for the serial link and the
//! hardware timers so the link pumps and the timer dispatcher can run on a
//! development host.

mod serial;
mod timers;

pub use serial::{SimulatedController, SimulatedRx, SimulatedSerial, SimulatedTx};
pub use timers::SimulatedTimerBank;

use crate::dispatcher::TimerDispatcher;

/// Advance the simulated counters by `ticks` and deliver every resulting
/// update interrupt to `dispatcher`.
///
/// Events are delivered in timer order. An event is discarded if an earlier
/// callback in the same step stopped or restarted that timer: the new
/// countdown only expires after its own period.
///
/// Returns the number of interrupts delivered.
pub fn step(dispatcher: &TimerDispatcher<SimulatedTimerBank>, ticks: u32) -> usize {
    let hal = dispatcher.hal();
    let mut delivered = 0;
    for (timer, starts) in hal.advance_tagged(ticks) {
        if hal.event_is_current(timer, starts) {
            dispatcher.on_period_elapsed(timer);
            delivered += 1;
        }
    }
    delivered
}
