//! One-shot timer callback dispatcher.
//!
//! The dispatcher owns one callback slot per [`TimerId`]. Application code
//! arms a timer with a period and an [`IsrCallback`]; the timer's update
//! interrupt calls [`TimerDispatcher::on_period_elapsed`], which stops the
//! counter, silences the steering PWM when the pulse window closes, and runs
//! the pending callback at most once.
//!
//! All slot accesses happen inside `critical_section::with`, so an `arm`
//! from task context cannot interleave with the interrupt handler. Firing
//! clears the slot: a second update interrupt without a fresh `arm` only
//! stops the hardware again and is counted as spurious.
//!
//! # Firmware wiring
//!
//! ```rust,ignore
//! static TIMERS: TimerDispatcher<Tim34Hal> =
//!     TimerDispatcher::new(Tim34Hal::new(), Duration::from_micros(625));
//!
//! #[interrupt]
//! fn TIM4() {
//!     TIMERS.on_period_elapsed(TimerId::Deadline);
//! }
//! ```

use core::cell::Cell;
use core::sync::atomic::{AtomicU32, Ordering};
use critical_section::Mutex;
use std::time::Duration;
use tracing::{debug, trace};
use vcu_common::config::TimerConfig;
use vcu_common::consts::{MAX_TIMER_TICKS, TIMER_COUNT};
use vcu_common::hal::timer::{IsrCallback, TimerError, TimerHal, TimerId, TimerState};

/// Counters kept by the dispatcher, for diagnostics only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Callbacks invoked, per timer slot.
    pub fired: [u32; TIMER_COUNT],
    /// Elapsed events that found an empty slot.
    pub spurious: u32,
    /// Pending callbacks overwritten by a later `arm` before they ran.
    pub replaced: u32,
}

/// Maps each hardware timer to at most one pending callback.
pub struct TimerDispatcher<H> {
    hal: H,
    tick: Duration,
    slots: Mutex<[Cell<Option<IsrCallback>>; TIMER_COUNT]>,
    fired: [AtomicU32; TIMER_COUNT],
    spurious: AtomicU32,
    replaced: AtomicU32,
}

impl<H: TimerHal> TimerDispatcher<H> {
    /// Create a dispatcher with all slots empty.
    ///
    /// `tick` is the counter period after prescaling; it is used to convert
    /// durations passed to [`arm`](Self::arm) into auto-reload values.
    ///
    /// # Panics
    /// Panics if `tick` is zero.
    pub const fn new(hal: H, tick: Duration) -> Self {
        assert!(!tick.is_zero(), "timer tick must be non-zero");
        Self {
            hal,
            tick,
            slots: Mutex::new([const { Cell::new(None) }; TIMER_COUNT]),
            fired: [const { AtomicU32::new(0) }; TIMER_COUNT],
            spurious: AtomicU32::new(0),
            replaced: AtomicU32::new(0),
        }
    }

    /// Create a dispatcher using the tick from a validated [`TimerConfig`].
    pub fn from_config(hal: H, config: &TimerConfig) -> Self {
        Self::new(hal, config.tick())
    }

    /// Underlying timer hardware.
    #[inline]
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Counter tick length.
    #[inline]
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Convert a period to whole ticks, rounding up.
    ///
    /// # Errors
    /// `TimerError::PeriodOutOfRange` if the period rounds to zero ticks or
    /// exceeds the 16-bit auto-reload register.
    pub fn ticks_for(&self, timer: TimerId, period: Duration) -> Result<u16, TimerError> {
        let ticks = period.as_nanos().div_ceil(self.tick.as_nanos());
        match u16::try_from(ticks) {
            Ok(t) if t > 0 => Ok(t),
            _ => Err(TimerError::PeriodOutOfRange {
                timer,
                ticks: u64::try_from(ticks).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Arm `timer` to fire once after `period` and run `callback` from the
    /// interrupt.
    ///
    /// Arming an already armed timer restarts the countdown and replaces the
    /// pending callback; only the newest one will run.
    ///
    /// # Errors
    /// `TimerError::PeriodOutOfRange` if `period` does not fit the counter;
    /// the slot and hardware are left untouched in that case.
    pub fn arm(
        &self,
        timer: TimerId,
        period: Duration,
        callback: IsrCallback,
    ) -> Result<(), TimerError> {
        let ticks = self.ticks_for(timer, period)?;
        self.arm_ticks(timer, ticks, callback)
    }

    /// Arm `timer` with a raw auto-reload value.
    ///
    /// # Errors
    /// `TimerError::PeriodOutOfRange` if `ticks` is zero, or whatever the
    /// hardware reports when starting the counter.
    pub fn arm_ticks(
        &self,
        timer: TimerId,
        ticks: u16,
        callback: IsrCallback,
    ) -> Result<(), TimerError> {
        if ticks == 0 {
            return Err(TimerError::PeriodOutOfRange { timer, ticks: 0 });
        }

        let replaced = critical_section::with(|cs| {
            let slot = &self.slots.borrow(cs)[timer.index()];
            // Slot first: the interrupt may fire as soon as the counter runs.
            let previous = slot.replace(Some(callback));
            if let Err(e) = self.hal.start_one_shot(timer, ticks) {
                slot.set(previous);
                return Err(e);
            }
            Ok(previous.is_some())
        })?;

        if replaced {
            self.replaced.fetch_add(1, Ordering::Relaxed);
        }
        debug!(
            "Armed {} timer for {} ticks (max {}){}",
            timer,
            ticks,
            MAX_TIMER_TICKS,
            if replaced { ", replaced pending callback" } else { "" }
        );
        Ok(())
    }

    /// Cancel a pending timer.
    ///
    /// Stops the counter and clears the slot. Cancelling the steering pulse
    /// window also ends the pulse train. Returns whether a callback was
    /// pending.
    pub fn disarm(&self, timer: TimerId) -> bool {
        let was_armed = critical_section::with(|cs| {
            self.hal.stop(timer);
            if timer.silences_pulse_output() {
                self.hal.silence_pulse_output();
            }
            self.slots.borrow(cs)[timer.index()].take().is_some()
        });
        if was_armed {
            debug!("Disarmed {} timer", timer);
        }
        was_armed
    }

    /// Interrupt entry point: the counter of `timer` reached its period.
    ///
    /// Runs entirely inside a critical section. Returns whether a callback
    /// was invoked.
    pub fn on_period_elapsed(&self, timer: TimerId) -> bool {
        let invoked = critical_section::with(|cs| {
            self.hal.stop(timer);
            if timer.silences_pulse_output() {
                self.hal.silence_pulse_output();
            }
            // Take before invoking so the callback may re-arm its own timer.
            match self.slots.borrow(cs)[timer.index()].take() {
                Some(callback) => {
                    callback.invoke();
                    true
                }
                None => false,
            }
        });

        if invoked {
            self.fired[timer.index()].fetch_add(1, Ordering::Relaxed);
            trace!("{} timer elapsed, callback invoked", timer);
        } else {
            let count = self.spurious.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("{} timer elapsed with no callback pending (#{})", timer, count);
        }
        invoked
    }

    /// Current state of `timer`'s slot.
    pub fn state(&self, timer: TimerId) -> TimerState {
        let pending = critical_section::with(|cs| self.slots.borrow(cs)[timer.index()].get());
        if pending.is_some() {
            TimerState::Armed
        } else {
            TimerState::Idle
        }
    }

    /// Snapshot of the dispatch counters.
    pub fn stats(&self) -> DispatcherStats {
        DispatcherStats {
            fired: core::array::from_fn(|i| self.fired[i].load(Ordering::Relaxed)),
            spurious: self.spurious.load(Ordering::Relaxed),
            replaced: self.replaced.load(Ordering::Relaxed),
        }
    }
}
