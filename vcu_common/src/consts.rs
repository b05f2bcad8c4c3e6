//! System-wide constants for the VCU workspace.
//!
//! Single source of truth for frame widths, queue sizing and timer limits.
//! Imported by all crates; do not redefine these elsewhere.

use static_assertions::const_assert;

/// Width of a request frame sent by the external controller [bytes].
pub const REQ_SIZE: usize = 3;

/// Width of a response frame sent back to the external controller [bytes].
pub const REP_SIZE: usize = 3;

/// Capacity of each link queue (inbound and outbound) [frames].
pub const LINK_QUEUE_CAPACITY: usize = 10;

/// Default bounded wait for enqueueing into a full link queue [ms].
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 200;

/// Upper bound accepted for `send_timeout_ms` in configuration [ms].
pub const MAX_SEND_TIMEOUT_MS: u64 = 60_000;

/// Number of hardware one-shot timers multiplexed by the dispatcher.
pub const TIMER_COUNT: usize = 3;

/// Default deadline timer tick: prescaler 52500 on an 84 MHz timer clock [µs].
pub const DEFAULT_TIMER_TICK_US: u32 = 625;

/// Largest period the 16-bit auto-reload register accepts [ticks].
pub const MAX_TIMER_TICKS: u32 = u16::MAX as u32;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vcu/vcu.toml";

/// Canonical service name (used for logging).
pub const VCU_SERVICE_NAME: &str = "vcu";

const_assert!(REQ_SIZE > 0);
const_assert!(REP_SIZE > 0);
const_assert!(LINK_QUEUE_CAPACITY > 0);
const_assert!(DEFAULT_SEND_TIMEOUT_MS <= MAX_SEND_TIMEOUT_MS);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_consistent() {
        assert_eq!(TIMER_COUNT, 3);
        assert!(DEFAULT_TIMER_TICK_US > 0);
        assert_eq!(MAX_TIMER_TICKS, 65_535);
    }

    #[test]
    fn default_timeout_matches_firmware_ticks() {
        // 200 kernel ticks at a 1 kHz tick rate.
        assert_eq!(DEFAULT_SEND_TIMEOUT_MS, 200);
    }
}
