//! Simulated one-shot timer bank.
//!
//! Models three up-counting timers with auto-reload plus the steering PWM
//! output that the pulse window gates. Like the real peripherals, a timer
//! keeps reloading and raising update events until it is stopped.

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Vec;
use vcu_common::consts::TIMER_COUNT;
use vcu_common::hal::timer::{TimerError, TimerHal, TimerId};

#[derive(Debug, Clone, Copy)]
struct SimTimer {
    running: bool,
    period: u16,
    remaining: u32,
    starts: u32,
}

impl SimTimer {
    const IDLE: Self = Self {
        running: false,
        period: 0,
        remaining: 0,
        starts: 0,
    };
}

#[derive(Debug, Clone, Copy)]
struct PulseOutput {
    active: bool,
    silenced: u32,
}

#[derive(Debug)]
struct BankState {
    timers: [SimTimer; TIMER_COUNT],
    pulse: PulseOutput,
}

/// In-memory implementation of [`TimerHal`].
pub struct SimulatedTimerBank {
    state: Mutex<RefCell<BankState>>,
}

impl SimulatedTimerBank {
    /// All timers stopped, pulse output idle.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(BankState {
                timers: [SimTimer::IDLE; TIMER_COUNT],
                pulse: PulseOutput {
                    active: false,
                    silenced: 0,
                },
            })),
        }
    }

    /// Start the steering PWM, as the steering logic does before opening a
    /// pulse window.
    pub fn start_pulse_output(&self) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).pulse.active = true);
    }

    /// Whether the steering PWM is currently driving pulses.
    pub fn pulse_output_active(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).pulse.active)
    }

    /// How many times the pulse output has been silenced.
    pub fn silence_count(&self) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).pulse.silenced)
    }

    /// Whether `timer`'s counter is running.
    pub fn is_running(&self, timer: TimerId) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).timers[timer.index()].running)
    }

    /// Auto-reload value of the last start, if the timer was ever started.
    pub fn programmed_period(&self, timer: TimerId) -> Option<u16> {
        critical_section::with(|cs| {
            let t = self.state.borrow_ref(cs).timers[timer.index()];
            (t.starts > 0).then_some(t.period)
        })
    }

    /// Ticks until the next update event of a running timer.
    pub fn remaining_ticks(&self, timer: TimerId) -> Option<u32> {
        critical_section::with(|cs| {
            let t = self.state.borrow_ref(cs).timers[timer.index()];
            t.running.then_some(t.remaining)
        })
    }

    /// Number of times `timer` was started.
    pub fn start_count(&self, timer: TimerId) -> u32 {
        critical_section::with(|cs| self.state.borrow_ref(cs).timers[timer.index()].starts)
    }

    /// Let `ticks` counter ticks pass.
    ///
    /// Returns the timers that raised an update event. A running timer
    /// reports at most one event per call and reloads its full period.
    pub fn advance(&self, ticks: u32) -> Vec<TimerId, TIMER_COUNT> {
        self.advance_tagged(ticks).iter().map(|(timer, _)| *timer).collect()
    }

    /// Like [`advance`](Self::advance), tagging each event with the start
    /// count it belongs to.
    pub(super) fn advance_tagged(&self, ticks: u32) -> Vec<(TimerId, u32), TIMER_COUNT> {
        let mut expired = Vec::new();
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            for (timer, sim) in TimerId::ALL.iter().zip(state.timers.iter_mut()) {
                if !sim.running {
                    continue;
                }
                if ticks >= sim.remaining {
                    sim.remaining = u32::from(sim.period);
                    // One slot per timer: cannot overflow.
                    let _ = expired.push((*timer, sim.starts));
                } else {
                    sim.remaining -= ticks;
                }
            }
        });
        expired
    }

    /// Whether an event tagged with `starts` still belongs to the running
    /// countdown, i.e. `timer` was neither stopped nor restarted since.
    pub(super) fn event_is_current(&self, timer: TimerId, starts: u32) -> bool {
        critical_section::with(|cs| {
            let t = self.state.borrow_ref(cs).timers[timer.index()];
            t.running && t.starts == starts
        })
    }
}

impl Default for SimulatedTimerBank {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerHal for SimulatedTimerBank {
    fn start_one_shot(&self, timer: TimerId, ticks: u16) -> Result<(), TimerError> {
        if ticks == 0 {
            return Err(TimerError::PeriodOutOfRange { timer, ticks: 0 });
        }
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let sim = &mut state.timers[timer.index()];
            sim.running = true;
            sim.period = ticks;
            sim.remaining = u32::from(ticks);
            sim.starts += 1;
        });
        Ok(())
    }

    fn stop(&self, timer: TimerId) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).timers[timer.index()].running = false;
        });
    }

    fn silence_pulse_output(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.pulse.active = false;
            state.pulse.silenced += 1;
        });
    }
}
