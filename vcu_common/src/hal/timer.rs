//! Hardware one-shot timer identities, trait and error types.
//!
//! Three countdown timers are available for one-shot deadline scheduling.
//! `SteerPulse` bounds the steering pulse train and cooperates with the PWM
//! timer that generates it; the two deadline timers are generic.

use crate::consts::{MAX_TIMER_TICKS, TIMER_COUNT};
use std::fmt;
use thiserror::Error;

/// Identity of a hardware one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerId {
    /// Steering pulse window (TIM3). Expiry also silences the PWM on TIM2 CH3.
    SteerPulse = 0,
    /// Generic deadline timer (TIM4).
    Deadline = 1,
    /// Generic deadline timer (TIM7).
    AuxDeadline = 2,
}

impl TimerId {
    /// All identities, in slot order.
    pub const ALL: [TimerId; TIMER_COUNT] = [Self::SteerPulse, Self::Deadline, Self::AuxDeadline];

    /// Slot index of this identity.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Convert from a slot index. Returns `None` for invalid values.
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::SteerPulse),
            1 => Some(Self::Deadline),
            2 => Some(Self::AuxDeadline),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::SteerPulse => "steer_pulse",
            Self::Deadline => "deadline",
            Self::AuxDeadline => "aux_deadline",
        }
    }

    /// Whether expiry of this timer must also silence the pulse PWM output.
    #[inline]
    pub const fn silences_pulse_output(self) -> bool {
        matches!(self, Self::SteerPulse)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-identity dispatcher state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No callback pending.
    Idle,
    /// Countdown running with a callback installed.
    Armed,
}

/// Callback invoked from interrupt context when a timer elapses.
///
/// Only plain `fn()` items are accepted: a callback cannot capture queue
/// handles, locks or other state it could wait on. It runs with interrupts
/// masked and must be short and non-blocking.
#[derive(Clone, Copy)]
pub struct IsrCallback(fn());

impl IsrCallback {
    /// Wrap a callback function.
    #[inline]
    pub const fn new(f: fn()) -> Self {
        Self(f)
    }

    /// Run the callback.
    #[inline]
    pub fn invoke(self) {
        (self.0)()
    }
}

impl fmt::Debug for IsrCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IsrCallback({:p})", self.0 as *const ())
    }
}

/// Error types for timer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Requested period does not fit the 16-bit auto-reload register.
    #[error("Period of {ticks} ticks out of range for {timer} timer (1..={max})", max = MAX_TIMER_TICKS)]
    PeriodOutOfRange {
        /// Timer being armed
        timer: TimerId,
        /// Requested period after tick conversion
        ticks: u64,
    },
}

/// One-shot hardware countdown timers.
///
/// Methods take `&self`: they are called both from task context (`arm`) and
/// from the timer interrupt, and implementations synchronise internally.
pub trait TimerHal: Sync {
    /// Load `ticks` into the auto-reload register and start counting with the
    /// update interrupt enabled.
    fn start_one_shot(&self, timer: TimerId, ticks: u16) -> Result<(), TimerError>;

    /// Stop the counter. Idempotent.
    fn stop(&self, timer: TimerId);

    /// Stop the pulse PWM timer and drive the steering output low.
    fn silence_pulse_output(&self);
}
